mod encoded_response;
mod error_response;
mod request;
mod response;
mod response_builder;
mod response_code;

pub use encoded_response::EncodedResponse;
pub use error_response::{ErrorResponse, ErrorType};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use response_builder::ResponseBuilder;
pub use response_code::ResponseCode;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Renders a string map with sorted keys, e.g. `{a: 1, b: 2}`.
pub(crate) struct DisplayMap<'a>(pub(crate) &'a HashMap<String, String>);

impl fmt::Display for DisplayMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sorted: BTreeMap<_, _> = self.0.iter().collect();
        f.write_str("{")?;
        for (i, (key, value)) in sorted.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}
