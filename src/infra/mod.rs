pub mod betaseries;
pub mod history;
