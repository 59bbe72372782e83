use marquee_model::TitleFilters;
use sqlx::{Postgres, QueryBuilder};

/// Columns of the titles table that may be used as a sort key. Anything
/// else supplied by a caller is ignored; user input is never interpolated
/// into the ORDER BY clause.
const TITLE_SORT_COLUMNS: &[&str] = &[
    "id",
    "title",
    "release_year",
    "director",
    "rating",
    "views_count",
    "duration",
];

/// Interpreted filter criteria, ready to extend a base join query.
///
/// Criteria values are always attached with bound parameters; only the
/// sort column (validated against [`TITLE_SORT_COLUMNS`]) becomes part of
/// the query text itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitlePredicate {
    search: Option<String>,
    genre_id: Option<i32>,
    category_id: Option<i32>,
    age_rating_id: Option<i32>,
    watched: Option<bool>,
    sort_column: Option<&'static str>,
}

impl TitlePredicate {
    pub fn from_filters(filters: &TitleFilters) -> Self {
        Self {
            search: filters
                .search
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            genre_id: parse_id_filter("genre_id", filters.genre_id.as_deref()),
            category_id: parse_id_filter(
                "category_id",
                filters.category_id.as_deref(),
            ),
            age_rating_id: parse_id_filter(
                "age_rating_id",
                filters.age_rating_id.as_deref(),
            ),
            watched: filters
                .watched
                .as_deref()
                .and_then(parse_watched_flag),
            sort_column: filters.sort.as_deref().and_then(sort_column),
        }
    }

    /// Append one `AND` clause per supplied criterion. The base query must
    /// already carry a `WHERE` clause (`WHERE 1=1` on the list queries).
    pub fn apply(&self, builder: &mut QueryBuilder<Postgres>) {
        if let Some(search) = &self.search {
            builder.push(" AND m.title ILIKE ");
            builder.push_bind(format!("%{}%", search));
        }

        if let Some(genre_id) = self.genre_id {
            builder.push(" AND g.id = ");
            builder.push_bind(genre_id);
        }

        if let Some(category_id) = self.category_id {
            builder.push(" AND c.id = ");
            builder.push_bind(category_id);
        }

        if let Some(age_rating_id) = self.age_rating_id {
            builder.push(" AND a.id = ");
            builder.push_bind(age_rating_id);
        }

        if let Some(watched) = self.watched {
            builder.push(" AND m.is_watched = ");
            builder.push_bind(watched);
        }
    }

    pub fn push_order_by(&self, builder: &mut QueryBuilder<Postgres>) {
        if let Some(column) = self.sort_column {
            builder.push(" ORDER BY m.");
            builder.push(column);
        }
    }
}

/// Id filters arrive as raw strings from the query layer. A value that is
/// not a valid integer cannot match any row, so the filter is dropped
/// rather than turned into a type error at the database.
fn parse_id_filter(name: &str, raw: Option<&str>) -> Option<i32> {
    let raw = raw.filter(|s| !s.is_empty())?;
    match raw.parse::<i32>() {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::debug!(filter = name, value = raw, "ignoring non-numeric id filter");
            None
        }
    }
}

/// Permissive boolean parse: only recognized spellings activate the
/// filter, everything else degrades to "filter absent".
fn parse_watched_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

fn sort_column(key: &str) -> Option<&'static str> {
    TITLE_SORT_COLUMNS
        .iter()
        .find(|column| **column == key)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters() -> TitleFilters {
        TitleFilters::default()
    }

    #[test]
    fn test_empty_filters_add_no_clauses() {
        let predicate = TitlePredicate::from_filters(&filters());
        let mut builder = QueryBuilder::new("SELECT 1 WHERE 1=1");
        predicate.apply(&mut builder);
        predicate.push_order_by(&mut builder);

        assert_eq!(builder.into_sql(), "SELECT 1 WHERE 1=1");
    }

    #[test]
    fn test_search_and_ids_become_bound_clauses() {
        let predicate = TitlePredicate::from_filters(&TitleFilters {
            search: Some("space".to_string()),
            genre_id: Some("3".to_string()),
            category_id: Some("7".to_string()),
            age_rating_id: Some("2".to_string()),
            ..filters()
        });

        let mut builder = QueryBuilder::new("SELECT 1 WHERE 1=1");
        predicate.apply(&mut builder);
        let sql = builder.into_sql();

        assert!(sql.contains("m.title ILIKE $1"));
        assert!(sql.contains("g.id = $2"));
        assert!(sql.contains("c.id = $3"));
        assert!(sql.contains("a.id = $4"));
        // The search term itself must be a parameter, never query text.
        assert!(!sql.contains("space"));
    }

    #[test]
    fn test_non_numeric_id_filter_is_dropped() {
        let predicate = TitlePredicate::from_filters(&TitleFilters {
            genre_id: Some("3; DROP TABLE genres".to_string()),
            ..filters()
        });

        let mut builder = QueryBuilder::new("SELECT 1 WHERE 1=1");
        predicate.apply(&mut builder);
        assert_eq!(builder.into_sql(), "SELECT 1 WHERE 1=1");
    }

    #[test]
    fn test_watched_flag_parses_permissively() {
        assert_eq!(parse_watched_flag("true"), Some(true));
        assert_eq!(parse_watched_flag("1"), Some(true));
        assert_eq!(parse_watched_flag("False"), Some(false));
        // Unparsable spellings degrade to "filter absent".
        assert_eq!(parse_watched_flag("yes"), None);
        assert_eq!(parse_watched_flag(""), None);
    }

    #[test]
    fn test_sort_key_is_allow_listed() {
        let predicate = TitlePredicate::from_filters(&TitleFilters {
            sort: Some("rating".to_string()),
            ..filters()
        });
        let mut builder = QueryBuilder::new("SELECT 1 WHERE 1=1");
        predicate.push_order_by(&mut builder);
        assert_eq!(builder.into_sql(), "SELECT 1 WHERE 1=1 ORDER BY m.rating");
    }

    #[test]
    fn test_unknown_sort_key_is_ignored() {
        let predicate = TitlePredicate::from_filters(&TitleFilters {
            sort: Some("rating; DROP TABLE titles".to_string()),
            ..filters()
        });
        let mut builder = QueryBuilder::new("SELECT 1 WHERE 1=1");
        predicate.push_order_by(&mut builder);
        assert_eq!(builder.into_sql(), "SELECT 1 WHERE 1=1");
    }
}
