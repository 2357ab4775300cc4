mod expression;
mod pattern;
mod statement;
mod type_name;

pub use self::expression::*;
pub use self::pattern::*;
pub use self::statement::*;
pub use self::type_name::*;
