//! Parser unit tests grouped by file section
