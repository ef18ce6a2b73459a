//! Registry of supported field property keywords.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordInfo<T> {
    /// Value a field is created with when it is requested without input.
    pub init_value: Option<T>,
    /// Values given for the top layer only are copied down each column.
    pub top: bool,
    /// EDIT section input multiplies instead of assigning.
    pub multiplier: bool,
}

impl<T> KeywordInfo<T> {
    pub const fn plain() -> Self {
        Self {
            init_value: None,
            top: false,
            multiplier: false,
        }
    }

    pub const fn init(value: T) -> Self {
        Self {
            init_value: Some(value),
            top: false,
            multiplier: false,
        }
    }

    const fn top_layer() -> Self {
        Self {
            init_value: None,
            top: true,
            multiplier: false,
        }
    }

    const fn multiplier(value: T) -> Self {
        Self {
            init_value: Some(value),
            top: false,
            multiplier: true,
        }
    }
}

const TOP_LAYER_KEYWORDS: [&str; 4] = ["DX", "DY", "DZ", "TOPS"];
const MULTIPLIER_KEYWORDS: [&str; 7] = [
    "MULTX", "MULTX-", "MULTY", "MULTY-", "MULTZ", "MULTZ-", "MULTPV",
];
const PLAIN_DOUBLE_KEYWORDS: [&str; 13] = [
    "PORO", "PERMX", "PERMY", "PERMZ", "PORV", "PRESSURE", "SWAT", "SGAS", "TEMPI", "SWATINIT",
    "MINPVV", "SWL", "SWCR",
];
const REGION_KEYWORDS: [&str; 10] = [
    "SATNUM", "PVTNUM", "EQLNUM", "FIPNUM", "IMBNUM", "ENDNUM", "FLUXNUM", "MULTNUM", "OPERNUM",
    "ROCKNUM",
];

pub const TRAN_KEYWORDS: [&str; 3] = ["TRANX", "TRANY", "TRANZ"];

pub fn double_keyword_info(name: &str) -> Option<KeywordInfo<f64>> {
    if TOP_LAYER_KEYWORDS.contains(&name) {
        return Some(KeywordInfo::top_layer());
    }
    if MULTIPLIER_KEYWORDS.contains(&name) {
        return Some(KeywordInfo::multiplier(1.0));
    }
    if name == "NTG" {
        return Some(KeywordInfo::init(1.0));
    }
    PLAIN_DOUBLE_KEYWORDS
        .contains(&name)
        .then(KeywordInfo::plain)
}

pub fn int_keyword_info(name: &str) -> Option<KeywordInfo<i32>> {
    if name == "ACTNUM" || REGION_KEYWORDS.contains(&name) || is_fipxxx(name) {
        return Some(KeywordInfo::init(1));
    }
    None
}

pub fn is_double_keyword(name: &str) -> bool {
    double_keyword_info(name).is_some()
}

pub fn is_int_keyword(name: &str) -> bool {
    int_keyword_info(name).is_some()
}

pub fn is_tran_keyword(name: &str) -> bool {
    TRAN_KEYWORDS.contains(&name)
}

/// User defined fluid-in-place regions, `FIPxxx`.
pub fn is_fipxxx(name: &str) -> bool {
    name.len() > 3 && name.len() <= 8 && name.starts_with("FIP")
}

/// Region array selected by the one letter code of the `xxxREG` keywords.
pub fn region_keyword_from_code(code: &str) -> Option<&'static str> {
    match code {
        "O" => Some("OPERNUM"),
        "F" => Some("FLUXNUM"),
        "M" => Some("MULTNUM"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{double_keyword_info, int_keyword_info, is_fipxxx, region_keyword_from_code};

    #[test]
    fn registry_flags_top_layer_and_multiplier_keywords() {
        assert!(double_keyword_info("TOPS").expect("TOPS").top);
        let multz = double_keyword_info("MULTZ-").expect("MULTZ-");
        assert!(multz.multiplier);
        assert_eq!(multz.init_value, Some(1.0));
        assert_eq!(double_keyword_info("PORO").expect("PORO").init_value, None);
        assert_eq!(int_keyword_info("SATNUM").expect("SATNUM").init_value, Some(1));
        assert!(double_keyword_info("SATNUM").is_none());
    }

    #[test]
    fn fip_regions_and_codes_resolve() {
        assert!(is_fipxxx("FIPZONE"));
        assert!(!is_fipxxx("FIP"));
        assert!(int_keyword_info("FIPABC").is_some());
        assert_eq!(region_keyword_from_code("M"), Some("MULTNUM"));
        assert_eq!(region_keyword_from_code("X"), None);
    }
}
