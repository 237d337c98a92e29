pub mod list;
pub mod pack;

pub use list::run as list;
pub use pack::run as pack;
