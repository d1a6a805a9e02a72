use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Goodreads shelf listing, e.g. https://www.goodreads.com/review/list/21047466-cheshire?shelf=read
selector!(GOODREADS_TABLE_SELECTOR, "table#books");
selector!(GOODREADS_ROW_SELECTOR, "table#books tbody tr");
selector!(GOODREADS_TITLE_SELECTOR, ".field.title .value");
selector!(GOODREADS_AUTHOR_SELECTOR, ".field.author .value");
selector!(GOODREADS_ISBN_SELECTOR, ".field.isbn13 .value");
selector!(GOODREADS_SHELF_SELECTOR, ".field.shelves .value a");
selector!(GOODREADS_DATE_READ_SELECTOR, ".field.date_read .date_read_value");
selector!(GOODREADS_NEXT_PAGE_SELECTOR, "a.next_page[href]");
selector!(GOODREADS_SELECTED_SHELF_SELECTOR, "a.selectedShelf");
// Goodreads book page, e.g. https://www.goodreads.com/book/show/11286.Carrion_Comfort
selector!(GOODREADS_BOOK_TITLE_SELECTOR, "h1[data-testid='bookTitle']");
selector!(GOODREADS_BOOK_AUTHOR_SELECTOR, ".ContributorLink__name");
// Storygraph "books read" listing and search results.
selector!(STORYGRAPH_PANE_SELECTOR, "div.book-pane[data-book-id]");
selector!(STORYGRAPH_PANE_TITLE_SELECTOR, ".book-title-author-and-series h3 a");
selector!(STORYGRAPH_PANE_AUTHOR_SELECTOR, ".book-title-author-and-series p a[href*='/authors/']");
selector!(STORYGRAPH_READ_DATE_SELECTOR, ".read-date");
selector!(STORYGRAPH_NEXT_PAGE_SELECTOR, "a[rel='next'][href]");
selector!(STORYGRAPH_SEARCH_RESULT_SELECTOR, "#search-results-ul li a[href]");
selector!(STORYGRAPH_RESULT_TITLE_SELECTOR, "h1:not(.sr-only)");
selector!(STORYGRAPH_RESULT_AUTHOR_SELECTOR, "h2:not(.sr-only)");
selector!(CSRF_TOKEN_SELECTOR, "meta[name='csrf-token'][content]");
selector!(ANCHOR_SELECTOR, "a[href]");

regex!(SHELF_COUNT_REGEX, r"\((\d{1,3}(?:,?\d{3})*)\)");
regex!(MONTH_DAY_YEAR_REGEX, r"\b([A-Za-z]{3})[a-z]*\.?\s+(\d{1,2}),?\s+(\d{4})\b");
regex!(ISBN_REGEX, r"^(?:\d{9}[\dX]|\d{13})$");
regex!(STORYGRAPH_BOOK_URL_REGEX, r"/books/([^/?#]+)");
regex!(WHITESPACE_REGEX, r"\s+");
