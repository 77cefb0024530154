//! Answers one first-aid query as a line of JSON.
//!
//! Usage: `first-aid-search "<query>"`

use refuge::corpus::FirstAidSection;

fn main() {
    refuge::query::main::<FirstAidSection>();
}
