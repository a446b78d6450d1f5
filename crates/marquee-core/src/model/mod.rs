pub mod catalog;

///
/// EntityModel
///
/// Per-entity allow-list of column names that clients may sort or page by.
/// Client-supplied column names are checked against this list before they
/// reach any predicate or ordering clause.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EntityModel {
    pub path: &'static str,
    pub fields: &'static [&'static str],
}

impl EntityModel {
    #[must_use]
    pub const fn new(path: &'static str, fields: &'static [&'static str]) -> Self {
        Self { path, fields }
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains(&name)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::catalog;

    #[test]
    fn catalog_models_expose_pagination_columns() {
        assert!(catalog::MOVIE.has_field("likeCount"));
        assert!(catalog::MOVIE.has_field("id"));
        assert!(!catalog::MOVIE.has_field("password"));
        assert!(!catalog::USER.has_field("password"));
    }

    #[test]
    fn has_field_is_case_sensitive() {
        assert!(!catalog::GENRE.has_field("Name"));
        assert!(catalog::GENRE.has_field("name"));
    }
}
