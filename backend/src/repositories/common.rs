//! Shared repository utilities.

use sqlx::{Postgres, QueryBuilder};

/// Appends WHERE or AND to the query builder depending on whether a clause has already been added.
pub fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally inside LIKE patterns.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_clause_starts_with_where_then_and() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM t");
        let mut has_clause = false;
        push_clause(&mut builder, &mut has_clause);
        builder.push("a = 1");
        push_clause(&mut builder, &mut has_clause);
        builder.push("b = 2");
        assert_eq!(builder.sql(), "SELECT 1 FROM t WHERE a = 1 AND b = 2");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("maíz"), "maíz");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(contains_pattern(" café "), "%café%");
    }
}
