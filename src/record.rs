//! The ASN record extracted from a country report row

/// One row of a country report.
///
/// Every field is kept as the text found on the page; nothing is trimmed or
/// checked for being numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsnRecord {
    /// ASN cell text with its two-character marker (normally `AS`) removed
    pub asn: String,

    /// Country code taken from the report URL, not from the page
    pub country: String,

    /// Organization name
    pub name: String,

    /// Number of announced IPv4 routes
    pub routes_v4: String,

    /// Number of announced IPv6 routes
    pub routes_v6: String,
}

impl AsnRecord {
    /// Builds a record from the raw cell texts of a report row.
    ///
    /// The ASN marker is removed by dropping the first two characters of
    /// `asn_cell`, whatever they are.
    pub fn from_cells(
        asn_cell: &str,
        country: &str,
        name: &str,
        routes_v4: &str,
        routes_v6: &str,
    ) -> Self {
        Self {
            asn: asn_cell.chars().skip(2).collect(),
            country: country.to_string(),
            name: name.to_string(),
            routes_v4: routes_v4.to_string(),
            routes_v6: routes_v6.to_string(),
        }
    }

    /// The ASN as a number, if the stripped cell text is one
    pub fn asn_number(&self) -> Option<u32> {
        self.asn.parse().ok()
    }
}
