//! Translation of request records into parameterized SQL fragments.
//!
//! Values are always bound, never spliced into the SQL text. The only
//! identifiers written into SQL come from [`Column`].

use sqlx::{QueryBuilder, Sqlite};

use super::models::{Book, EmptyField, FieldValue, PartialBook};

/// Columns of the `book` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    BookId,
    Isbn,
    Title,
    AuthorName,
    AuthorSurname,
    Published,
    Publisher,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::BookId,
        Column::Isbn,
        Column::Title,
        Column::AuthorName,
        Column::AuthorSurname,
        Column::Published,
        Column::Publisher,
    ];

    /// Column name, identical to the JSON field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Column::BookId => "book_id",
            Column::Isbn => "isbn",
            Column::Title => "title",
            Column::AuthorName => "author_name",
            Column::AuthorSurname => "author_surname",
            Column::Published => "published",
            Column::Publisher => "publisher",
        }
    }

    /// Look up a client-supplied column name against the allow-list.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.as_str() == name)
    }
}

/// How populated fields combine into a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// `column LIKE '%value%'` joined with `OR`
    Contains,
    /// `column = value` joined with `AND`
    Exact,
}

impl MatchMode {
    fn joiner(self) -> &'static str {
        match self {
            MatchMode::Contains => " OR ",
            MatchMode::Exact => " AND ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Bound {
    Int(i64),
    Text(String),
}

/// Filter built from the non-zero fields of a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    mode: MatchMode,
    conditions: Vec<(Column, Bound)>,
}

impl Predicate {
    /// `None` when no field is populated; there is nothing to filter on.
    pub fn from_book(book: &Book, mode: MatchMode) -> Option<Self> {
        let conditions: Vec<(Column, Bound)> = book
            .fields()
            .into_iter()
            .filter(|(_, value)| !value.is_zero())
            .map(|(column, value)| {
                let bound = match (mode, value) {
                    (MatchMode::Contains, value) => Bound::Text(format!("%{}%", value)),
                    (MatchMode::Exact, FieldValue::Int(v)) => Bound::Int(v),
                    (MatchMode::Exact, FieldValue::Text(v)) => Bound::Text(v.to_string()),
                };
                (column, bound)
            })
            .collect();

        if conditions.is_empty() {
            None
        } else {
            Some(Self { mode, conditions })
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.conditions.iter().map(|(column, _)| *column)
    }

    /// Append `<condition> [OR|AND <condition>]...` with bound values.
    pub fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        let operator = match self.mode {
            MatchMode::Contains => " LIKE ",
            MatchMode::Exact => " = ",
        };

        for (i, (column, bound)) in self.conditions.iter().enumerate() {
            if i > 0 {
                builder.push(self.mode.joiner());
            }
            builder.push(column.as_str()).push(operator);
            match bound {
                Bound::Int(v) => builder.push_bind(*v),
                Bound::Text(v) => builder.push_bind(v.clone()),
            };
        }
    }
}

/// `SET` list of a PATCH plus the fields it leaves out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSet {
    book_id: i64,
    assignments: Vec<(Column, String)>,
    omitted: Vec<Column>,
}

pub const OMITTED_FIELDS_WARNING: &str = "following fields were not included in the update:";

impl PatchSet {
    /// Fails when `book_id` is zero; absent or empty strings become warnings.
    pub fn from_partial(book: &PartialBook) -> Result<Self, EmptyField> {
        if book.book_id == 0 {
            return Err(EmptyField(Column::BookId.as_str()));
        }

        let mut assignments = Vec::new();
        let mut omitted = Vec::new();
        for (column, value) in book.text_fields() {
            match value {
                Some(value) => assignments.push((column, value.to_string())),
                None => omitted.push(column),
            }
        }

        Ok(Self {
            book_id: book.book_id,
            assignments,
            omitted,
        })
    }

    pub fn book_id(&self) -> i64 {
        self.book_id
    }

    /// No column to assign; storage treats this as a no-op.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn omitted(&self) -> &[Column] {
        &self.omitted
    }

    /// `following fields were not included in the update: isbn, title`
    pub fn warning(&self) -> Option<String> {
        if self.omitted.is_empty() {
            return None;
        }

        let fields: Vec<&str> = self.omitted.iter().map(|column| column.as_str()).collect();
        Some(format!("{} {}", OMITTED_FIELDS_WARNING, fields.join(", ")))
    }

    /// Append `col = ?, col = ? WHERE book_id = ?`.
    pub fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        let mut set = builder.separated(", ");
        for (column, value) in &self.assignments {
            set.push(column.as_str())
                .push_unseparated(" = ")
                .push_bind_unseparated(value.clone());
        }

        builder
            .push(" WHERE book_id = ")
            .push_bind(self.book_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(fields: impl FnOnce(&mut Book)) -> Book {
        let mut book = Book::default();
        fields(&mut book);
        book
    }

    fn sql_of(predicate: &Predicate) -> String {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM book WHERE ");
        predicate.push_to(&mut builder);
        builder.sql().to_string()
    }

    #[test]
    fn column_allow_list() {
        assert_eq!(Column::parse("author_surname"), Some(Column::AuthorSurname));
        assert_eq!(Column::parse("Title"), None);
        assert_eq!(Column::parse("1; DROP TABLE book"), None);
        for column in Column::ALL {
            assert_eq!(Column::parse(column.as_str()), Some(column));
        }
    }

    #[test]
    fn empty_book_yields_no_predicate() {
        assert_eq!(Predicate::from_book(&Book::default(), MatchMode::Contains), None);
        assert_eq!(Predicate::from_book(&Book::default(), MatchMode::Exact), None);
    }

    #[test]
    fn contains_mode_joins_with_or() {
        let book = search(|b| {
            b.title = "dune".into();
            b.publisher = "ace".into();
        });
        let predicate = Predicate::from_book(&book, MatchMode::Contains).unwrap();

        assert_eq!(
            sql_of(&predicate),
            "SELECT * FROM book WHERE title LIKE ? OR publisher LIKE ?"
        );
        assert_eq!(
            predicate.conditions,
            vec![
                (Column::Title, Bound::Text("%dune%".into())),
                (Column::Publisher, Bound::Text("%ace%".into())),
            ]
        );
    }

    #[test]
    fn exact_mode_joins_with_and_and_keeps_ids_numeric() {
        let book = search(|b| {
            b.book_id = 4;
            b.isbn = "978-0441013593".into();
        });
        let predicate = Predicate::from_book(&book, MatchMode::Exact).unwrap();

        assert_eq!(
            sql_of(&predicate),
            "SELECT * FROM book WHERE book_id = ? AND isbn = ?"
        );
        assert_eq!(
            predicate.columns().collect::<Vec<_>>(),
            vec![Column::BookId, Column::Isbn]
        );
        assert_eq!(predicate.conditions[0].1, Bound::Int(4));
    }

    #[test]
    fn contains_mode_matches_book_id_as_text() {
        let book = search(|b| b.book_id = 12);
        let predicate = Predicate::from_book(&book, MatchMode::Contains).unwrap();

        assert_eq!(sql_of(&predicate), "SELECT * FROM book WHERE book_id LIKE ?");
        assert_eq!(
            predicate.conditions,
            vec![(Column::BookId, Bound::Text("%12%".into()))]
        );
    }

    #[test]
    fn quotes_stay_out_of_the_sql_text() {
        let book = search(|b| b.title = "O'Reilly' OR '1'='1".into());
        let predicate = Predicate::from_book(&book, MatchMode::Exact).unwrap();
        assert_eq!(sql_of(&predicate), "SELECT * FROM book WHERE title = ?");
    }

    #[test]
    fn patch_requires_book_id() {
        let err = PatchSet::from_partial(&PartialBook::default()).unwrap_err();
        assert_eq!(err, EmptyField("book_id"));
    }

    #[test]
    fn patch_splits_assignments_and_warnings() {
        let patch = PatchSet::from_partial(&PartialBook {
            book_id: 9,
            title: Some("Dune Messiah".into()),
            publisher: Some(String::new()),
            ..PartialBook::default()
        })
        .unwrap();

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE book SET ");
        patch.push_to(&mut builder);
        assert_eq!(builder.sql(), "UPDATE book SET title = ? WHERE book_id = ?");
        assert_eq!(
            patch.warning().unwrap(),
            "following fields were not included in the update: \
             isbn, author_name, author_surname, published, publisher"
        );
    }

    #[test]
    fn patch_with_only_book_id_is_empty_and_warns_about_everything() {
        let patch = PatchSet::from_partial(&PartialBook {
            book_id: 1,
            ..PartialBook::default()
        })
        .unwrap();

        assert!(patch.is_empty());
        assert_eq!(patch.omitted().len(), 6);
        assert!(patch.warning().unwrap().ends_with(
            "isbn, title, author_name, author_surname, published, publisher"
        ));
    }

    #[test]
    fn full_patch_has_no_warning() {
        let patch = PatchSet::from_partial(&PartialBook {
            book_id: 1,
            isbn: Some("1".into()),
            title: Some("t".into()),
            author_name: Some("a".into()),
            author_surname: Some("s".into()),
            published: Some("p".into()),
            publisher: Some("pub".into()),
        })
        .unwrap();

        assert_eq!(patch.warning(), None);
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE book SET ");
        patch.push_to(&mut builder);
        assert_eq!(
            builder.sql(),
            "UPDATE book SET isbn = ?, title = ?, author_name = ?, author_surname = ?, \
             published = ?, publisher = ? WHERE book_id = ?"
        );
    }
}
