use regex::Regex;

pub const TICKET_PREFIX: &str = "TKT-";
/// 数字部分补零后的宽度
pub const TICKET_WIDTH: usize = 6;

lazy_static::lazy_static! {
    static ref TICKET_SUFFIX: Regex = Regex::new(r"(\d+)$").expect("ticket suffix pattern");
}

/// 取出工单号末尾的数字
pub fn ticket_number(ticket_id: &str) -> Option<u64> {
    TICKET_SUFFIX
        .captures(ticket_id)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// 根据当前最大的工单号生成下一个，没有工单时从 1 开始
pub fn next_ticket_id(latest: Option<&str>) -> String {
    let next = latest.and_then(ticket_number).unwrap_or(0) + 1;
    format!("{TICKET_PREFIX}{next:0width$}", width = TICKET_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ticket() {
        assert_eq!(next_ticket_id(None), "TKT-000001");
    }

    #[test]
    fn increments_numeric_suffix() {
        assert_eq!(next_ticket_id(Some("TKT-000041")), "TKT-000042");
        assert_eq!(next_ticket_id(Some("TKT-000999")), "TKT-001000");
    }

    #[test]
    fn unparsable_latest_restarts() {
        assert_eq!(next_ticket_id(Some("legacy")), "TKT-000001");
    }

    #[test]
    fn widens_past_six_digits() {
        assert_eq!(next_ticket_id(Some("TKT-999999")), "TKT-1000000");
        assert_eq!(ticket_number("TKT-1000000"), Some(1_000_000));
    }
}
