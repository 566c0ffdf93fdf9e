//! Build fragments in both binding modes and print what they carry.
//!
//! Run with: cargo run --example expressions

use dbal::{DbalResult, ExpressionBuilder, ParamList, Part, SqlitePlatform};
use std::sync::Arc;

fn main() -> DbalResult<()> {
    // Positional mode: every bound value becomes a `?`.
    let mut eb = ExpressionBuilder::new(Arc::new(SqlitePlatform), false);

    let adults = eb.gte("age", 18i64, None)?;
    let admin = eb.eq("role", "admin", None)?;
    let recent = eb.raw("created_at > datetime('now', '-7 days')", ParamList::new());
    let filter = eb.and([
        Part::from(adults),
        Part::from(eb.or([admin, recent])?),
    ])?;

    println!("WHERE {filter}");
    for entry in filter.params().iter() {
        println!("  bind {:?}", entry.param.value());
    }

    // Named mode: generated placeholders, numbered per builder.
    let mut eb = ExpressionBuilder::new(Arc::new(SqlitePlatform), true);

    let ids = eb.in_list("id", [10i64, 11, 12], None)?;
    let pattern = eb.like("email", "%@example.com", None)?;
    let filter = eb.and([ids, pattern])?;

    println!("WHERE {filter}");
    for entry in filter.params().iter() {
        println!(
            "  bind {} = {:?}",
            entry.placeholder.as_deref().unwrap_or("?"),
            entry.param.value()
        );
    }

    Ok(())
}
