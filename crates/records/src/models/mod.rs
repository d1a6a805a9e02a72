mod fields;
mod source;
mod status;

pub use self::fields::Fields;
pub use self::source::Source;
pub use self::status::Status;

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace(['-', '_', ' '], "")
}
