//! Built-in formatters

mod boolean;
mod choice;
mod clip;
mod list;
mod map;
mod number;
mod optional;
mod size;
mod string;

use std::sync::Arc;

pub use boolean::BoolFormatter;
pub use choice::ChoiceFormatter;
pub use clip::ClipFormatter;
pub use list::ListFormatter;
pub use map::MapFormatter;
pub use number::NumberFormatter;
pub use optional::{OptionalFormatter, SupplierFormatter};
pub use size::SizeFormatter;
pub use string::StringFormatter;

use super::ParameterFormatter;

/// All built-in formatters in registration order
pub fn default_formatters() -> Vec<Arc<dyn ParameterFormatter>> {
    vec![
        Arc::new(StringFormatter),
        Arc::new(NumberFormatter),
        Arc::new(BoolFormatter),
        Arc::new(ChoiceFormatter),
        Arc::new(SizeFormatter),
        Arc::new(ClipFormatter),
        Arc::new(ListFormatter),
        Arc::new(MapFormatter),
        Arc::new(OptionalFormatter),
        Arc::new(SupplierFormatter),
    ]
}
