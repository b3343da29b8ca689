use crate::session::error::LocatorError;

const HREF_SEPARATOR: char = '-';
const ITEM_SEGMENT: usize = 0;
const TEST_SEGMENT: usize = 2;

/// Definition locators carried by an item reference href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLocators {
    pub item_definition: String,
    pub test_definition: String,
}

/// Splits `{itemDefinition}-{reserved}-{testDefinition}[-...]`. Segment 1 is
/// reserved by the packaging format and ignored here.
pub fn decompose(href: &str) -> Result<ResultLocators, LocatorError> {
    let segments: Vec<&str> = href.split(HREF_SEPARATOR).collect();
    let malformed = || LocatorError {
        href: href.to_string(),
        segments: segments.len(),
    };

    let item_definition = segments
        .get(ITEM_SEGMENT)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(malformed)?;
    let test_definition = segments
        .get(TEST_SEGMENT)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(malformed)?;

    Ok(ResultLocators {
        item_definition: item_definition.to_string(),
        test_definition: test_definition.to_string(),
    })
}
