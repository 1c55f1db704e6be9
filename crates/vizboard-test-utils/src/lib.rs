//! Shared test fixtures: small CSV datasets and multipart body builders.

pub use pretty_assertions;

pub mod fixtures {
    /// `Category` holds `A, A, B`.
    pub const CATEGORY_CSV: &str = "Category,Amount\nA,10\nA,20\nB,5\n";

    pub const STORE_SALES_CSV: &str = "Store,Sales\n1,24924.5\n2,46039.49\n1,41595.55\n";

    pub const STORE_PROFIT_CSV: &str = "Store,Profit\n1,120.5\n3,98.25\n";

    pub const DISJOINT_CSV: &str = "Region,Units\nNorth,4\nSouth,9\n";

    /// Build a CSV document from a header and rows.
    pub fn csv(header: &[&str], rows: &[&[&str]]) -> String {
        let mut out = header.join(",");
        out.push('\n');
        for row in rows {
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }
}

/// A `multipart/form-data` body assembled in memory.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("vizboard-{}", uuid::Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn file(mut self, field: &str, filename: &str, contents: &[u8]) -> Self {
        let head = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
            self.boundary, field, filename
        );
        self.body.extend_from_slice(head.as_bytes());
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, field: &str, value: &str) -> Self {
        let part = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            self.boundary, field, value
        );
        self.body.extend_from_slice(part.as_bytes());
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Close the body and return `(content type, bytes)`.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        let tail = format!("--{}--\r\n", self.boundary);
        self.body.extend_from_slice(tail.as_bytes());
        (self.content_type(), self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_builder() {
        let doc = fixtures::csv(&["a", "b"], &[&["1", "2"], &["3", "4"]]);
        assert_eq!(doc, "a,b\n1,2\n3,4\n");
    }

    #[test]
    fn test_multipart_body_is_terminated() {
        let (ct, body) = MultipartBody::new().file("file", "x.csv", b"a\n1\n").finish();
        let text = String::from_utf8(body).unwrap();
        let boundary = ct.split("boundary=").nth(1).unwrap();
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
        assert!(text.contains("filename=\"x.csv\""));
    }
}
