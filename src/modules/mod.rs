pub mod fit_matcher;
pub mod session;
