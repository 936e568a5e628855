//! Centralized constants
//!
//! Vocabulary namespaces, classification thresholds and pool sizing.

/// Graph vocabulary
pub mod vocabulary {
    /// Namespace of expression classes and properties
    pub const EXPR_NS: &str = "https://w3id.org/exgraph/expr#";

    /// `rdf:type`
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// XML Schema datatype namespace
    pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

    /// Path segment under the base IRI for expression nodes
    pub const EXPR_PATH_SEGMENT: &str = "expr/";
}

/// Literal classification
pub mod literals {
    /// Largest byte value accepted in a literal binary segment
    pub const MAX_BYTE: i64 = 255;

    /// Largest Unicode scalar value (charlist heuristic upper bound)
    pub const MAX_CODEPOINT: i64 = 0x10FFFF;

    /// Highest `&N` position the compiler accepts in a capture
    pub const MAX_CAPTURE_PLACEHOLDER: i64 = 255;
}

/// Thread pool configuration for batch compilation
pub mod thread_pool {
    /// Percentage of available CPU cores used when parallelism is not configured
    pub const CPU_UTILIZATION_PERCENT: f64 = 0.75;

    /// Minimum number of threads
    pub const MIN_THREADS: usize = 1;

    /// Upper bound accepted by config validation
    pub const MAX_THREADS: usize = 512;
}

/// File classification
pub mod classification {
    /// Path markers of external dependency code
    pub const DEFAULT_DEPENDENCY_MARKERS: &[&str] = &["deps/", "_build/"];
}
