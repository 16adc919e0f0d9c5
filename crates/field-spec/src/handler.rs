use std::error::Error;
use std::fmt;

type TypeFilter = fn(&(dyn Error + 'static)) -> bool;

/// Maps an application error onto a user facing message.
#[derive(Clone)]
pub struct Handler {
    pub pattern: String,
    pub message: String,
    type_name: Option<&'static str>,
    filter: Option<TypeFilter>,
}

impl Handler {
    /// Matches any error type whose text contains `pattern`.
    pub fn any(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
            type_name: None,
            filter: None,
        }
    }

    /// Matches only errors whose concrete type is `E`.
    pub fn of_type<E: Error + 'static>(
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let filter: TypeFilter = |err| err.is::<E>();
        Self {
            pattern: pattern.into(),
            message: message.into(),
            type_name: Some(std::any::type_name::<E>()),
            filter: Some(filter),
        }
    }

    pub fn matches(&self, err: &(dyn Error + 'static)) -> bool {
        self.filter.is_none_or(|filter| filter(err)) && err.to_string().contains(&self.pattern)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("pattern", &self.pattern)
            .field("message", &self.message)
            .field("type", &self.type_name.unwrap_or("any"))
            .finish()
    }
}

/// Newest registration wins.
pub fn find_match<'a>(handlers: &'a [Handler], err: &(dyn Error + 'static)) -> Option<&'a Handler> {
    handlers.iter().rev().find(|handler| handler.matches(err))
}
