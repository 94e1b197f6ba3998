//! Maps validated menu requests onto executor calls.
//!
//! Raw text arguments are parsed here. Anything malformed is rejected as an
//! [`InputError`] before the executor, and therefore storage, is touched.
//! Negative prices and quantities are rejected here as well; the table's
//! CHECK constraints only back this up.

use std::str::FromStr;

use log::debug;

use crate::error::{InputError, StorageError};
use crate::executor::{Executor, Outcome};
use crate::record::{NewRecord, Record, RecordId};
use crate::report::Report;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Create,
    ReadAll,
    Update,
    Delete,
    Exit,
}

impl Selection {
    /// Menu entries in display order.
    pub const ALL: [Selection; 5] = [
        Selection::Create,
        Selection::ReadAll,
        Selection::Update,
        Selection::Delete,
        Selection::Exit,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Selection::Create => "1",
            Selection::ReadAll => "2",
            Selection::Update => "3",
            Selection::Delete => "4",
            Selection::Exit => "5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Selection::Create => "Create New Product",
            Selection::ReadAll => "Read All Products",
            Selection::Update => "Update Product Details",
            Selection::Delete => "Delete Product",
            Selection::Exit => "Exit",
        }
    }
}

impl FromStr for Selection {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let choice = s.trim();
        Self::ALL
            .into_iter()
            .find(|selection| selection.key() == choice)
            .ok_or_else(|| InputError::UnknownSelection(choice.to_string()))
    }
}

/// An operation request with its arguments as the user typed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Create {
        name: String,
        price: String,
        quantity: String,
    },
    ReadAll,
    Update {
        id: String,
        name: String,
        price: String,
        quantity: String,
    },
    Delete {
        id: String,
    },
    Exit,
}

impl Request {
    pub fn selection(&self) -> Selection {
        match self {
            Request::Create { .. } => Selection::Create,
            Request::ReadAll => Selection::ReadAll,
            Request::Update { .. } => Selection::Update,
            Request::Delete { .. } => Selection::Delete,
            Request::Exit => Selection::Exit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Records(Vec<Record>),
    Mutation(Outcome),
    Rejected(InputError),
    ReadFailed(StorageError),
    Exit,
}

impl Response {
    pub fn is_exit(&self) -> bool {
        matches!(self, Response::Exit)
    }

    pub fn report(&self) -> Option<Report> {
        match self {
            Response::Mutation(outcome) => Report::from_outcome(outcome),
            Response::Rejected(error) => Some(Report::input(error)),
            Response::ReadFailed(error) => Some(Report::read_failed(error)),
            Response::Records(_) | Response::Exit => None,
        }
    }
}

fn parse_id(text: &str) -> Result<RecordId, InputError> {
    let text = text.trim();
    text.parse().map_err(|_| InputError::InvalidNumber {
        field: "ID",
        value: text.to_string(),
    })
}

/// Kept as typed; only a blank name is refused.
fn parse_name(text: &str) -> Result<String, InputError> {
    if text.trim().is_empty() {
        return Err(InputError::EmptyName);
    }
    Ok(text.to_string())
}

fn parse_price(text: &str) -> Result<f64, InputError> {
    let text = text.trim();
    let price: f64 = text
        .parse()
        .ok()
        .filter(|p: &f64| p.is_finite())
        .ok_or_else(|| InputError::InvalidNumber {
            field: "price",
            value: text.to_string(),
        })?;
    if price < 0.0 {
        return Err(InputError::Negative { field: "price" });
    }
    // "-0" parses to negative zero, which would render as "$-0.00".
    Ok(price + 0.0)
}

fn parse_quantity(text: &str) -> Result<i64, InputError> {
    let text = text.trim();
    let quantity: i64 = text.parse().map_err(|_| InputError::InvalidNumber {
        field: "quantity",
        value: text.to_string(),
    })?;
    if quantity < 0 {
        return Err(InputError::Negative { field: "quantity" });
    }
    Ok(quantity)
}

fn parse_product(name: &str, price: &str, quantity: &str) -> Result<NewRecord, InputError> {
    Ok(NewRecord::new(
        parse_name(name)?,
        parse_price(price)?,
        parse_quantity(quantity)?,
    ))
}

pub struct Dispatcher<S> {
    executor: Executor<S>,
}

impl<S: Session> Dispatcher<S> {
    pub fn new(session: S) -> Self {
        Self {
            executor: Executor::new(session),
        }
    }

    pub fn executor(&self) -> &Executor<S> {
        &self.executor
    }

    /// Run one request to completion, including its commit or rollback.
    pub fn dispatch(&mut self, request: Request) -> Response {
        debug!("dispatching {:?}", request.selection());
        let response = match self.run(request) {
            Ok(response) => response,
            Err(error) => Response::Rejected(error),
        };
        if let Some(report) = response.report() {
            report.emit();
        }
        response
    }

    fn run(&mut self, request: Request) -> Result<Response, InputError> {
        Ok(match request {
            Request::Create {
                name,
                price,
                quantity,
            } => {
                let record = parse_product(&name, &price, &quantity)?;
                Response::Mutation(self.executor.create(&record))
            }
            Request::ReadAll => {
                let mut records = Vec::new();
                match self.executor.read_all(|record| records.push(record)) {
                    Ok(_) => Response::Records(records),
                    Err(error) => Response::ReadFailed(error),
                }
            }
            Request::Update {
                id,
                name,
                price,
                quantity,
            } => {
                let id = parse_id(&id)?;
                let record = parse_product(&name, &price, &quantity)?.with_id(id);
                Response::Mutation(self.executor.update(&record))
            }
            Request::Delete { id } => {
                let id = parse_id(&id)?;
                Response::Mutation(self.executor.delete(id))
            }
            Request::Exit => Response::Exit,
        })
    }

    /// Close the session. Safe to call whether or not it ever connected.
    pub fn shutdown(mut self) -> Result<(), StorageError> {
        self.executor.close()
    }
}
