pub mod input_filter;
pub mod input_scanner;

pub use input_filter::InputFilter;
pub use input_scanner::InputScanner;
