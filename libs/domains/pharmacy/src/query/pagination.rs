use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{PharmacyError, PharmacyResult};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Raw `pagina` / `limite` query parameters (`page` / `limit` also accepted)
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page number, starting at 1 (default 1)
    #[serde(alias = "page")]
    #[param(minimum = 1)]
    pub pagina: Option<i64>,
    /// Page size between 1 and 100 (default 10)
    #[serde(alias = "limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limite: Option<i64>,
}

impl PageParams {
    pub fn validate(&self) -> PharmacyResult<Page> {
        let number = self.pagina.unwrap_or(1);
        if number < 1 {
            return Err(PharmacyError::InvalidPagination(format!(
                "pagina must be at least 1, got {}",
                number
            )));
        }

        let size = self.limite.unwrap_or(DEFAULT_PAGE_SIZE as i64);
        if !(1..=MAX_PAGE_SIZE as i64).contains(&size) {
            return Err(PharmacyError::InvalidPagination(format!(
                "limite must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, size
            )));
        }

        // The store takes the offset as a signed 64-bit integer.
        if (number - 1).checked_mul(size).is_none() {
            return Err(PharmacyError::InvalidPagination(format!(
                "pagina {} is too large for limite {}",
                number, size
            )));
        }

        Ok(Page {
            number: number.unsigned_abs(),
            size: size.unsigned_abs(),
        })
    }
}

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

impl Page {
    pub fn new(number: i64, size: i64) -> PharmacyResult<Self> {
        PageParams {
            pagina: Some(number),
            limite: Some(size),
        }
        .validate()
    }

    /// Records before this page; at most `i64::MAX` for validated pages
    pub fn skip(&self) -> u64 {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated listing envelope
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    /// Current page number
    pub pagina: u64,
    /// Records matching the filter across all pages
    pub total: u64,
    /// Number of pages, `ceil(total / limite)`
    pub paginas: u64,
    /// Page size
    pub limite: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: Page, total: u64) -> Self {
        Self {
            data,
            pagina: page.number,
            total,
            paginas: total.div_ceil(page.size),
            limite: page.size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagina: self.pagina,
            total: self.total,
            paginas: self.paginas,
            limite: self.limite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageParams::default().validate().unwrap();
        assert_eq!(page, Page { number: 1, size: 10 });
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn test_skip() {
        assert_eq!(Page::new(3, 20).unwrap().skip(), 40);
    }

    #[test]
    fn test_out_of_range_rejected() {
        for (pagina, limite) in [(0, 10), (-1, 10), (1, 0), (1, 101)] {
            let params = PageParams {
                pagina: Some(pagina),
                limite: Some(limite),
            };
            assert!(matches!(
                params.validate(),
                Err(PharmacyError::InvalidPagination(_))
            ));
        }
        assert!(Page::new(1, 100).is_ok());
    }

    #[test]
    fn test_huge_page_numbers() {
        let params = PageParams {
            pagina: Some(200_000_000_000_000_000),
            limite: Some(100),
        };
        assert!(matches!(
            params.validate(),
            Err(PharmacyError::InvalidPagination(_))
        ));

        // Largest offset that still fits the store's signed skip
        let size = 100i64;
        let last = i64::MAX / size + 1;
        let page = Page::new(last, size).unwrap();
        assert_eq!(page.skip(), (i64::MAX / size * size) as u64);
        assert!(page.skip() <= i64::MAX as u64);
        assert!(Page::new(last + 1, size).is_err());
        assert!(Page::new(i64::MAX, 1).is_ok());
    }

    #[test]
    fn test_page_count_is_ceiling() {
        let page = Page::new(1, 10).unwrap();
        assert_eq!(Paginated::<u8>::new(vec![], page, 0).paginas, 0);
        assert_eq!(Paginated::<u8>::new(vec![], page, 10).paginas, 1);
        assert_eq!(Paginated::<u8>::new(vec![], page, 11).paginas, 2);
    }

    #[test]
    fn test_pages_cover_total() {
        let total = 23u64;
        let size = 5u64;
        let pages = total.div_ceil(size);
        let covered: u64 = (1..=pages)
            .map(|n| {
                let page = Page::new(n as i64, size as i64).unwrap();
                (total - page.skip()).min(size)
            })
            .sum();
        assert_eq!(covered, total);
    }

    #[test]
    fn test_envelope_field_names() {
        let envelope = Paginated::new(vec![1, 2], Page::new(2, 2).unwrap(), 5);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"data": [1, 2], "pagina": 2, "total": 5, "paginas": 3, "limite": 2})
        );
    }

    #[test]
    fn test_params_accept_english_aliases() {
        let params: PageParams =
            serde_json::from_value(serde_json::json!({"page": 2, "limit": 50})).unwrap();
        assert_eq!(params.validate().unwrap(), Page { number: 2, size: 50 });
    }
}
