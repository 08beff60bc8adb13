pub mod vcgencmd;

pub use vcgencmd::Vcgencmd;
