//! Command line front end of omigami-selection: configuration loading,
//! dataset reading and result/report writing.
pub mod input;
pub mod run;
pub mod util;
