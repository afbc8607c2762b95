use std::fmt;

/// Terminal outcome of an operation that ends the request with an HTTP
/// redirect.
///
/// Replaces the never-returning control transfer of the original protocol:
/// the request pipeline must emit this as the response and stop processing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a redirect terminates the request and must be emitted as the response"]
pub struct Redirect {
    location: String,
}

impl Redirect {
    pub(crate) fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Target of the `Location` header.
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redirect to {}", self.location)
    }
}
