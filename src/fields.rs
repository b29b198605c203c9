//! Fixed-offset field extraction from semi-structured API log lines.
//!
//! The lines are JSON-ish but not valid JSON once the nested escaping is applied, so nothing
//! here parses them. Each field is anchored on a literal marker and sliced out either as a
//! fixed-width window or up to a closing delimiter. Every lookup is an explicit
//! `Option<usize>`, so "marker missing" and "marker at offset 0" can never be confused.

/// Value written for `userId` when the line carries none.
pub const USER_ID_DEFAULT: &str = "00000000";

/// Leading timestamp width (`2025-06-18T20:58:32.084920+08:00`).
const LOG_TIME_WIDTH: usize = 32;

/// Column names of the tabular output, in record order.
pub const CSV_HEADERS: [&str; 13] = [
    "logTime",
    "sign",
    "requestUrl",
    "userId",
    "traceId",
    "paySerialNumber",
    "paySerialNo",
    "requestReferenceNumber",
    "user_id",
    "lot_number",
    "phone",
    "verifyCode",
    "userIp",
];

/// A marker followed by a value of known width.
///
/// `offset` is measured from the start of the match. It usually equals `marker.len()`, but a few
/// production fields start their window on the marker's last character and that has to be kept
/// for the output to line up with existing reports.
#[derive(Clone, Copy, Debug)]
struct FixedField {
    marker: &'static str,
    offset: usize,
    width: usize,
}

impl FixedField {
    const fn new(marker: &'static str, offset: usize, width: usize) -> Self {
        Self { marker, offset, width }
    }

    #[inline]
    fn locate(&self, line: &str) -> Option<usize> {
        line.find(self.marker)
    }

    /// Window of `width` bytes at `found + offset`, or `None` when the line is too short
    /// (or the window would cut a multi-byte character).
    #[inline]
    fn window<'a>(&self, line: &'a str, found: usize) -> Option<&'a str> {
        let start = found.checked_add(self.offset)?;
        let end = start.checked_add(self.width)?;
        line.get(start..end)
    }

    fn extract<'a>(&self, line: &'a str) -> &'a str {
        self.locate(line)
            .and_then(|found| self.window(line, found))
            .unwrap_or("")
    }
}

/// A marker whose value runs up to the next `delimiter`.
#[derive(Clone, Copy, Debug)]
struct DelimitedField {
    marker: &'static str,
    delimiter: &'static str,
}

impl DelimitedField {
    fn extract<'a>(&self, line: &'a str) -> &'a str {
        let Some(found) = line.find(self.marker) else { return "" };
        let Some(rest) = line.get(found + self.marker.len()..) else { return "" };
        match rest.find(self.delimiter) {
            Some(end) => &rest[..end],
            None => "",
        }
    }
}

const SIGN: FixedField = FixedField::new(r#""sign":[""#, 9, 32);
const VERIFY_CODE: FixedField = FixedField::new(r#""verifyCode":""#, 14, 6);
const USER_ID: FixedField = FixedField::new(r#""userId":""#, 10, 8);
const USER_ID_ALT: FixedField = FixedField::new(r#""user_id":"#, 9, 9);
const LOT_NUMBER: FixedField = FixedField::new(r#"\"lot_number\":\""#, 16, 33);
const PHONE: FixedField = FixedField::new(r#""phone":"#, 8, 11);
const TRACE_ID: FixedField = FixedField::new(r#""traceId":""#, 11, 36);
const PAY_SERIAL_NUMBER: FixedField = FixedField::new(r#""paySerialNumber":""#, 19, 16);
const PAY_SERIAL_NO: FixedField = FixedField::new(r#""paySerialNo":""#, 15, 16);
const REQUEST_REFERENCE_NUMBER: FixedField = FixedField::new(r#""requestReferenceNumber":""#, 26, 36);
const REQUEST_REFERENCE_NO_HEADER: FixedField = FixedField::new(r#""Request-Reference-No":""#, 24, 36);

const REQUEST_URL: DelimitedField = DelimitedField { marker: r#""requestUrl":""#, delimiter: r#"",""# };
const USER_IP: DelimitedField = DelimitedField { marker: r#""userIp":""#, delimiter: "\"" };

/// One extracted log line. Field order matches [`CSV_HEADERS`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogRecord {
    pub log_time: String,
    pub sign: String,
    pub request_url: String,
    pub user_id: String,
    pub trace_id: String,
    pub pay_serial_number: String,
    pub pay_serial_no: String,
    pub request_reference_number: String,
    /// `user_id` column: the snake_case id some services log next to `userId`.
    pub user_id_alt: String,
    pub lot_number: String,
    pub phone: String,
    pub verify_code: String,
    pub user_ip: String,
}

impl LogRecord {
    /// Borrow all fields in output column order.
    pub fn columns(&self) -> [&str; 13] {
        [
            &self.log_time,
            &self.sign,
            &self.request_url,
            &self.user_id,
            &self.trace_id,
            &self.pay_serial_number,
            &self.pay_serial_no,
            &self.request_reference_number,
            &self.user_id_alt,
            &self.lot_number,
            &self.phone,
            &self.verify_code,
            &self.user_ip,
        ]
    }
}

/// Extract all fields from one raw line. Pure; never panics on short or odd input.
pub fn parse_log_line(line: &str) -> LogRecord {
    let request_reference_number = match REQUEST_REFERENCE_NUMBER.locate(line) {
        Some(found) => REQUEST_REFERENCE_NUMBER.window(line, found).unwrap_or(""),
        None => REQUEST_REFERENCE_NO_HEADER.extract(line),
    };

    let user_id = match USER_ID.extract(line) {
        "" => USER_ID_DEFAULT,
        id => id,
    };

    LogRecord {
        log_time: line.get(..LOG_TIME_WIDTH).unwrap_or("").to_string(),
        sign: SIGN.extract(line).to_string(),
        request_url: REQUEST_URL.extract(line).to_string(),
        user_id: user_id.to_string(),
        trace_id: TRACE_ID.extract(line).to_string(),
        pay_serial_number: PAY_SERIAL_NUMBER.extract(line).to_string(),
        pay_serial_no: PAY_SERIAL_NO.extract(line).to_string(),
        request_reference_number: request_reference_number.to_string(),
        user_id_alt: USER_ID_ALT.extract(line).to_string(),
        lot_number: LOT_NUMBER.extract(line).to_string(),
        phone: PHONE.extract(line).to_string(),
        verify_code: VERIFY_CODE.extract(line).to_string(),
        user_ip: USER_IP.extract(line).to_string(),
    }
}

/// True iff at least one field is non-blank.
pub fn has_valid_data(record: &LogRecord) -> bool {
    record.columns().iter().any(|f| !f.trim().is_empty())
}

/// Extract a record and report whether it should be emitted.
pub fn extract_log_fields(line: &str) -> (LogRecord, bool) {
    let record = parse_log_line(line);
    let valid = has_valid_data(&record);
    (record, valid)
}
