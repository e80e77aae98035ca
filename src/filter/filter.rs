use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{ListParams, Pagination, TodoQuery, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};

impl TodoQuery {
    /// Build a query from raw parameters. Nothing here fails: numbers are read
    /// from their leading digits, values without any fall back to defaults and
    /// out-of-range ones are clamped.
    pub fn from_params(params: &ListParams) -> Self {
        let page = parse_number(params.page.as_deref()).unwrap_or(DEFAULT_PAGE as i64);
        let limit = parse_number(params.limit.as_deref()).unwrap_or(DEFAULT_LIMIT as i64);

        Self {
            filter: FilterWhere::parse(params.status.as_deref(), params.priority.as_deref()),
            sort: FilterOrder::parse(params.sort_by.as_deref(), params.order.as_deref()),
            page: clamp_page(page),
            limit: clamp_limit(limit),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.limit as u64
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination {
            total,
            page: self.page,
            limit: self.limit,
            total_pages: total.div_ceil(self.limit.max(1) as u64),
        }
    }
}

pub fn clamp_page(page: i64) -> u32 {
    page.clamp(1, u32::MAX as i64) as u32
}

pub fn clamp_limit(limit: i64) -> u32 {
    limit.clamp(1, MAX_LIMIT as i64) as u32
}

/// Leading integer of `value`: `"5abc"` is 5, `"2.5"` is 2, `"abc"` is none.
fn parse_number(value: Option<&str>) -> Option<i64> {
    let value = value?.trim_start();
    let (negative, rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }

    // Too many digits for i64 still clamps to the largest page/limit
    let magnitude = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
