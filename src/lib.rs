//! meetcue: reconcile today's calendar agenda into crontab entries that pop
//! open each video meeting just before it starts.
//!
//! The crontab's managed block (everything after the anchor marker) is
//! rebuilt on every run, so the tool is idempotent and self-cleaning:
//! yesterday's entries disappear the moment today's run commits.

pub mod agenda;
pub mod backup;
pub mod classify;
pub mod config;
pub mod crontab;
pub mod error;
pub mod exec;
pub mod gcal;
pub mod holiday;
pub mod logfile;
pub mod ports;
pub mod reconcile;
pub mod run;
pub mod timemath;
