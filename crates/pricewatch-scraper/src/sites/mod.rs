//! Site extractor registry and dispatch.
//!
//! One extractor implementation exists per supported storefront; the
//! dispatcher resolves a product URL (or an explicit site hint) to its
//! extractor and caches one instance per site, so rendered extractors
//! share their browser pool across calls.

pub(crate) mod extract;

mod banimode;
mod basalam;
mod digikala;
mod digistyle;
mod emalls;
mod finalir;
mod generic;
mod gooshishop;
mod hamrahtel;
mod kalatik;
mod khanoumi;
mod meghdadit;
mod mobile140;
mod mobit;
mod okala;
mod plaza;
mod snappmarket;
mod technolife;
mod timcheh;
mod torob;
mod zanbil;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use pricewatch_core::{AppConfig, CrawlResult};

use crate::browser::PagePool;
use crate::error::ScrapeError;
use crate::fetch::FetchClient;

/// Closed set of supported site identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteId {
    Digikala,
    Technolife,
    Mobit,
    Timcheh,
    Okala,
    Banimode,
    Khanoumi,
    Digistyle,
    Mobile140,
    Hamrahtel,
    Gooshishop,
    Meghdadit,
    Plaza,
    Final,
    Zanbil,
    Kalatik,
    Basalam,
    SnappMarket,
    Torob,
    Emalls,
    /// Designated fallback for unmatched hostnames: structured data plus
    /// the selector/text heuristics shared by most storefront engines.
    Generic,
}

impl SiteId {
    pub const ALL: &'static [SiteId] = &[
        SiteId::Digikala,
        SiteId::Technolife,
        SiteId::Mobit,
        SiteId::Timcheh,
        SiteId::Okala,
        SiteId::Banimode,
        SiteId::Khanoumi,
        SiteId::Digistyle,
        SiteId::Mobile140,
        SiteId::Hamrahtel,
        SiteId::Gooshishop,
        SiteId::Meghdadit,
        SiteId::Plaza,
        SiteId::Final,
        SiteId::Zanbil,
        SiteId::Kalatik,
        SiteId::Basalam,
        SiteId::SnappMarket,
        SiteId::Torob,
        SiteId::Emalls,
        SiteId::Generic,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SiteId::Digikala => "digikala",
            SiteId::Technolife => "technolife",
            SiteId::Mobit => "mobit",
            SiteId::Timcheh => "timcheh",
            SiteId::Okala => "okala",
            SiteId::Banimode => "banimode",
            SiteId::Khanoumi => "khanoumi",
            SiteId::Digistyle => "digistyle",
            SiteId::Mobile140 => "mobile140",
            SiteId::Hamrahtel => "hamrahtel",
            SiteId::Gooshishop => "gooshishop",
            SiteId::Meghdadit => "meghdadit",
            SiteId::Plaza => "plaza",
            SiteId::Final => "final",
            SiteId::Zanbil => "zanbil",
            SiteId::Kalatik => "kalatik",
            SiteId::Basalam => "basalam",
            SiteId::SnappMarket => "snappmarket",
            SiteId::Torob => "torob",
            SiteId::Emalls => "emalls",
            SiteId::Generic => "generic",
        }
    }

    /// Whether this site needs the headless browser (client-side rendered
    /// price block) rather than a plain HTTP fetch.
    #[must_use]
    pub fn is_rendered(self) -> bool {
        matches!(
            self,
            SiteId::Okala | SiteId::SnappMarket | SiteId::Torob | SiteId::Emalls
        )
    }

    /// Derives the site identity from a URL hostname. First match in the
    /// table wins; unmatched hostnames fall back to [`SiteId::Generic`].
    #[must_use]
    pub fn for_host(host: &str) -> SiteId {
        let host = host.trim().to_ascii_lowercase();
        for (suffix, site) in HOST_TABLE {
            if host == *suffix || host.ends_with(&format!(".{suffix}")) {
                return *site;
            }
        }
        SiteId::Generic
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SiteId {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SiteId::ALL
            .iter()
            .copied()
            .find(|site| site.as_str() == s)
            .ok_or_else(|| ScrapeError::UnknownSite(s.to_string()))
    }
}

/// Hostname suffix → site identity. Subdomains match their parent entry
/// (`www.digikala.com`, `m.digikala.com` → Digikala).
const HOST_TABLE: &[(&str, SiteId)] = &[
    ("digikala.com", SiteId::Digikala),
    ("technolife.ir", SiteId::Technolife),
    ("mobit.ir", SiteId::Mobit),
    ("timcheh.com", SiteId::Timcheh),
    ("okala.com", SiteId::Okala),
    ("banimode.com", SiteId::Banimode),
    ("khanoumi.com", SiteId::Khanoumi),
    ("digistyle.com", SiteId::Digistyle),
    ("mobile140.com", SiteId::Mobile140),
    ("hamrahtel.com", SiteId::Hamrahtel),
    ("gooshishop.com", SiteId::Gooshishop),
    ("meghdadit.com", SiteId::Meghdadit),
    ("plaza.ir", SiteId::Plaza),
    ("final.ir", SiteId::Final),
    ("zanbil.ir", SiteId::Zanbil),
    ("kalatik.com", SiteId::Kalatik),
    ("basalam.com", SiteId::Basalam),
    ("snapp.market", SiteId::SnappMarket),
    ("torob.com", SiteId::Torob),
    ("emalls.ir", SiteId::Emalls),
];

/// The crawl capability implemented once per supported site.
#[async_trait]
pub trait SiteExtractor: Send + Sync {
    /// Identity this extractor serves.
    fn site(&self) -> SiteId;

    /// Runs the site's layered extraction strategies and returns the
    /// canonical integer price.
    ///
    /// # Errors
    ///
    /// Returns the extractor error taxonomy: [`ScrapeError::HttpStatus`],
    /// [`ScrapeError::Unavailable`], [`ScrapeError::PriceNotFound`], or a
    /// passthrough fetch/navigation failure.
    async fn extract(&self, url: &str) -> Result<u64, ScrapeError>;

    /// Crawl entry point used by the orchestrator. Every failure path
    /// folds into the returned [`CrawlResult`]; nothing escapes the
    /// extractor boundary.
    async fn crawl(&self, url: &str) -> CrawlResult {
        match self.extract(url).await {
            Ok(price) => {
                tracing::debug!(site = %self.site(), url, price, "price extracted");
                CrawlResult::ok(price)
            }
            Err(err) => {
                tracing::debug!(site = %self.site(), url, error = %err, "crawl failed");
                CrawlResult::fail(err.to_string())
            }
        }
    }
}

impl std::fmt::Debug for dyn SiteExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteExtractor")
            .field("site", &self.site())
            .finish()
    }
}

/// Resolves URLs to extractor instances.
///
/// Holds the shared static-fetch client and browser page pool, and caches
/// one extractor per site identity so pooled resources are reused across
/// the whole refresh run.
pub struct Dispatcher {
    fetch: Arc<FetchClient>,
    pool: Arc<PagePool>,
    cache: Mutex<HashMap<SiteId, Arc<dyn SiteExtractor>>>,
}

impl Dispatcher {
    /// Builds a dispatcher (and its shared fetch client and page pool)
    /// from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, ScrapeError> {
        let fetch = Arc::new(FetchClient::new(
            config.request_timeout_secs,
            &config.user_agent,
        )?);
        let pool = Arc::new(PagePool::new(
            config.browser_pool_size,
            config.navigation_timeout_secs,
            config.render_settle_ms,
        ));
        Ok(Self {
            fetch,
            pool,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Resolves the extractor for `url`. An explicit `site_hint` wins over
    /// hostname detection; an unparseable URL with no hint resolves to the
    /// generic fallback.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::UnknownSite`] when `site_hint` names no
    /// registered site.
    pub fn resolve(
        &self,
        url: &str,
        site_hint: Option<&str>,
    ) -> Result<Arc<dyn SiteExtractor>, ScrapeError> {
        let site = match site_hint {
            Some(hint) => hint.parse::<SiteId>()?,
            None => SiteId::for_host(&host_of(url)),
        };

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(extractor) = cache.get(&site) {
            return Ok(Arc::clone(extractor));
        }

        let extractor = self.build(site);
        cache.insert(site, Arc::clone(&extractor));
        Ok(extractor)
    }

    /// Tears down the shared browser pool. Call once when the refresh run
    /// that owns this dispatcher finishes.
    pub async fn shutdown(&self) {
        self.pool.close().await;
    }

    fn build(&self, site: SiteId) -> Arc<dyn SiteExtractor> {
        let fetch = &self.fetch;
        let pool = &self.pool;
        match site {
            SiteId::Digikala => Arc::new(digikala::Digikala::new(Arc::clone(fetch))),
            SiteId::Technolife => Arc::new(technolife::Technolife::new(Arc::clone(fetch))),
            SiteId::Mobit => Arc::new(mobit::Mobit::new(Arc::clone(fetch))),
            SiteId::Timcheh => Arc::new(timcheh::Timcheh::new(Arc::clone(fetch))),
            SiteId::Okala => Arc::new(okala::Okala::new(Arc::clone(pool))),
            SiteId::Banimode => Arc::new(banimode::Banimode::new(Arc::clone(fetch))),
            SiteId::Khanoumi => Arc::new(khanoumi::Khanoumi::new(Arc::clone(fetch))),
            SiteId::Digistyle => Arc::new(digistyle::Digistyle::new(Arc::clone(fetch))),
            SiteId::Mobile140 => Arc::new(mobile140::Mobile140::new(Arc::clone(fetch))),
            SiteId::Hamrahtel => Arc::new(hamrahtel::Hamrahtel::new(Arc::clone(fetch))),
            SiteId::Gooshishop => Arc::new(gooshishop::Gooshishop::new(Arc::clone(fetch))),
            SiteId::Meghdadit => Arc::new(meghdadit::Meghdadit::new(Arc::clone(fetch))),
            SiteId::Plaza => Arc::new(plaza::Plaza::new(Arc::clone(fetch))),
            SiteId::Final => Arc::new(finalir::Final::new(Arc::clone(fetch))),
            SiteId::Zanbil => Arc::new(zanbil::Zanbil::new(Arc::clone(fetch))),
            SiteId::Kalatik => Arc::new(kalatik::Kalatik::new(Arc::clone(fetch))),
            SiteId::Basalam => Arc::new(basalam::Basalam::new(Arc::clone(fetch))),
            SiteId::SnappMarket => Arc::new(snappmarket::SnappMarket::new(Arc::clone(pool))),
            SiteId::Torob => Arc::new(torob::Torob::new(Arc::clone(pool))),
            SiteId::Emalls => Arc::new(emalls::Emalls::new(Arc::clone(pool))),
            SiteId::Generic => Arc::new(generic::Generic::new(Arc::clone(fetch))),
        }
    }
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_default()
}
