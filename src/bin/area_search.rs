//! Answers one assembly area query as a line of JSON.
//!
//! Usage: `area-search "<query>"`

use refuge::corpus::AssemblyArea;

fn main() {
    refuge::query::main::<AssemblyArea>();
}
