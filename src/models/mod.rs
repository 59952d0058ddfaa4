pub mod alert;
pub mod bucket;
pub mod observation;
pub mod product;
pub mod ranking;
pub mod summary;

pub use alert::*;
pub use bucket::*;
pub use observation::*;
pub use product::*;
pub use ranking::*;
pub use summary::*;
