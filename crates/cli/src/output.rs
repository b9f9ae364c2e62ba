use ferrous_lookup_infrastructure::dns::{DnsResponse, ResponseParser};
use std::fmt::Write;

/// Renders a response the way the tool prints it: a header line, then one
/// answer record per line in presentation form.
pub fn render(domain: &str, response: &DnsResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "DNS Response for {}:", domain);

    if response.is_nxdomain() {
        out.push_str("  (no such domain, status NXDOMAIN)\n");
        return out;
    }
    if response.is_nodata() {
        out.push_str("  (no records of the requested type)\n");
        return out;
    }
    if response.answers().is_empty() {
        let _ = writeln!(
            out,
            "  (no answers, status {})",
            ResponseParser::rcode_to_status(response.rcode)
        );
        return out;
    }

    for record in response.answers() {
        let _ = writeln!(out, "  {}", record);
    }
    if response.truncated {
        out.push_str("  (response truncated)\n");
    }
    out
}
