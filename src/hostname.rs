//! Hostname validation according to [IETF RFC 1123](https://tools.ietf.org/html/rfc1123).

const MAX_HOSTNAME: usize = 253;
const MAX_LABEL: usize = 63;

/// A hostname is valid if every dot-separated label is 1 to 63 characters of `a-zA-Z0-9-`
/// which neither starts nor ends with `-`, and the whole name is at most 253 characters.
pub fn is_valid(hostname: &str) -> bool {
    fn is_valid_label(label: &str) -> bool {
        !label.is_empty()
            && label.len() <= MAX_LABEL
            && !(label.starts_with('-') || label.ends_with('-'))
            && label.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
    }

    !hostname.is_empty()
        && hostname.len() <= MAX_HOSTNAME
        && hostname.split('.').all(is_valid_label)
}
