//! Namespace URIs used by WordprocessingML parts

/// WordprocessingML main namespace (transitional)
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// WordprocessingML main namespace (strict)
pub const W_STRICT: &str = "http://purl.oclc.org/ooxml/wordprocessingml/main";

/// The reserved `xml:` namespace
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Office document relationships namespace
pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Check whether a namespace URI is one of the WordprocessingML main namespaces
pub fn is_wordprocessingml(namespace: &str) -> bool {
    namespace == W || namespace == W_STRICT
}
