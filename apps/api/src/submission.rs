use parrot_application::FormInput;
use url::form_urlencoded;

/// `application/x-www-form-urlencoded` body split into fields, selected ids
/// and the spoofed method.
///
/// Repeated field names keep the last value, so a switch rendered as a hidden
/// `0` followed by a checked `1` reads as `1`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Submission {
    fields: FormInput,
    ids: Vec<String>,
    method: Option<String>,
}

impl Submission {
    pub fn parse(body: &[u8]) -> Self {
        let mut submission = Self::default();
        for (key, value) in form_urlencoded::parse(body) {
            match key.as_ref() {
                "_method" => submission.method = Some(value.trim().to_ascii_uppercase()),
                "ids" | "ids[]" => submission.ids.push(value.into_owned()),
                _ => {
                    submission.fields.insert(key.into_owned(), value.into_owned());
                }
            }
        }

        submission
    }

    pub fn fields(&self) -> &FormInput {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }
}
