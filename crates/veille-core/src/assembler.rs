//! Offer assembly: walks a listing page, enriches each node into an
//! [`Offer`], and hands it to the classifier and store collaborators.

use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};

use crate::config::ScrapeConfig;
use crate::error::AppError;
use crate::models::{BatchReport, MIN_URL_LEN, NodeOutcome, Offer, SkipReason, Tag};
use crate::parsers::{ContractTypeParser, DateParser, DegreeParser};
use crate::traits::{Classifier, OfferStore, PageFetcher};

/// Raw per-node fields captured from the listing document.
///
/// Captured eagerly: the parsed document cannot cross an await point, and
/// per-offer field derivation must read only the node's own text no matter
/// how nodes end up scheduled.
#[derive(Debug, Clone)]
struct ListingEntry {
    href: String,
    title: String,
    description: String,
    raw_text: String,
}

/// Orchestrates the full pipeline over a listing page: scan nodes, gate on
/// url length, fetch detail content, parse degrees/type, classify, persist.
///
/// Generic over all external collaborators via traits, enabling dependency
/// injection and deterministic tests without network or storage.
#[derive(Debug)]
pub struct OfferAssembler<F, C, S>
where
    F: PageFetcher,
    C: Classifier,
    S: OfferStore,
{
    fetcher: F,
    classifier: C,
    store: S,
    offers: Selector,
    titles: Selector,
    description: Selector,
    details: Selector,
    degrees: DegreeParser,
    contract: ContractTypeParser,
    dates: DateParser,
    concurrency: usize,
}

impl<F, C, S> OfferAssembler<F, C, S>
where
    F: PageFetcher,
    C: Classifier,
    S: OfferStore,
{
    /// Compile the config's selectors and patterns and wire in the
    /// collaborators. Fails on any invalid selector or pattern.
    pub fn new(config: &ScrapeConfig, fetcher: F, classifier: C, store: S) -> Result<Self, AppError> {
        Ok(Self {
            offers: parse_selector(&config.offers_selector)?,
            titles: parse_selector(&config.titles_selector)?,
            description: parse_selector(&config.description_selector)?,
            details: parse_selector(&config.details_selector)?,
            degrees: DegreeParser::new(&config.degree_pattern)?,
            contract: ContractTypeParser::new(&config.type_pattern, &config.default_type)?,
            dates: DateParser::new()?,
            concurrency: config.concurrency.max(1),
            fetcher,
            classifier,
            store,
        })
    }

    /// Process every offer node on `listing_url`.
    ///
    /// The listing fetch is the only fatal failure; each node is otherwise
    /// isolated and reports its own outcome. Nodes run through a bounded
    /// worker pool, so persistence order may differ from listing order.
    pub async fn harvest(&self, listing_url: &str) -> Result<BatchReport, AppError> {
        tracing::info!("Fetching listing {listing_url}");
        let html = self.fetcher.fetch(listing_url).await?;
        tracing::info!("Fetched {} bytes of HTML", html.len());

        let entries = self.scan_listing(&html);
        tracing::info!(nodes = entries.len(), "Listing scanned");

        let outcomes = stream::iter(entries)
            .map(|entry| self.process_entry(entry))
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let report = BatchReport::new(outcomes);
        tracing::info!(
            persisted = report.persisted(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Batch complete"
        );
        Ok(report)
    }

    /// Fetch `url` and concatenate the text of every detail-selector match
    /// in document order, collapsing doubled newlines into single spaces.
    /// Zero matches produce an empty string, not an error.
    pub async fn extract_content(&self, url: &str) -> Result<String, AppError> {
        let html = self.fetcher.fetch(url).await?;
        Ok(select_text(&html, &self.details))
    }

    fn scan_listing(&self, html: &str) -> Vec<ListingEntry> {
        let document = Html::parse_document(html);
        document
            .select(&self.offers)
            .map(|node| ListingEntry {
                href: node
                    .select(&self.titles)
                    .filter_map(|a| a.value().attr("href"))
                    .collect(),
                title: node
                    .select(&self.titles)
                    .flat_map(|a| a.text())
                    .collect(),
                description: node
                    .select(&self.description)
                    .flat_map(|a| a.text())
                    .collect(),
                raw_text: node.text().collect(),
            })
            .collect()
    }

    async fn process_entry(&self, entry: ListingEntry) -> NodeOutcome {
        // First two date-like tokens in the node become publish/expiry;
        // fewer than two leaves both unset.
        let dates = self.dates.extract(&entry.raw_text);
        let (published, expires) = if dates.len() > 1 {
            (Some(dates[0].clone()), Some(dates[1].clone()))
        } else {
            (None, None)
        };

        if entry.href.len() < MIN_URL_LEN {
            tracing::debug!(href = %entry.href, "Node skipped");
            return NodeOutcome::Skipped {
                href: entry.href,
                reason: SkipReason::UrlTooShort,
            };
        }

        let mut offer = Offer::new(entry.href, entry.title, entry.description, published, expires);
        match self.enrich(&mut offer).await {
            Ok(()) => {
                tracing::info!(url = %offer.url, "Offer persisted");
                NodeOutcome::Persisted { url: offer.url }
            }
            Err(error) => {
                tracing::warn!(url = %offer.url, %error, "Offer failed");
                NodeOutcome::Failed {
                    url: offer.url,
                    error,
                }
            }
        }
    }

    async fn enrich(&self, offer: &mut Offer) -> Result<(), AppError> {
        offer.content = self.extract_content(&offer.url).await?;
        offer.degrees = self.degrees.extract(&offer.content);
        offer.contract_type = self.contract.extract(&offer.content);

        let labels = self.classifier.categorize(offer).await?;
        offer.tags = labels.into_iter().map(Tag::new).collect();

        self.store.create(offer).await
    }
}

fn parse_selector(raw: &str) -> Result<Selector, AppError> {
    Selector::parse(raw).map_err(|e| AppError::SelectorError(format!("{raw:?}: {e}")))
}

fn select_text(html: &str, selector: &Selector) -> String {
    let document = Html::parse_document(html);
    let mut content = String::new();
    for node in document.select(selector) {
        content.extend(node.text());
    }
    content.replace("\n\n", " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Degree;
    use crate::testutil::*;

    const LISTING_URL: &str = "https://jobs.example.com/listing";
    const OFFER_1: &str = "https://jobs.example.com/offers/1";
    const OFFER_2: &str = "https://jobs.example.com/offers/2";

    fn listing_node(href: &str, title: &str, desc: &str, dates: &str) -> String {
        format!(
            r##"<li class="box row">
                 <div class="text-col">
                   <h4><a href="{href}">{title}</a></h4>
                   <p class="entry-title"><a href="#">{desc}</a></p>
                 </div>
                 <span class="meta">{dates}</span>
               </li>"##
        )
    }

    fn listing_page(nodes: &[String]) -> String {
        format!(
            r#"<html><body><ul id="myList">{}</ul></body></html>"#,
            nodes.join("\n")
        )
    }

    fn detail_page(body: &str) -> String {
        format!(
            r#"<html><body><div class="detailsOffre">
                 <div>{body}</div>
                 <div class="content-area">navigation junk</div>
               </div></body></html>"#
        )
    }

    fn assembler(
        fetcher: MockFetcher,
        classifier: MockClassifier,
        store: MockStore,
    ) -> OfferAssembler<MockFetcher, MockClassifier, MockStore> {
        OfferAssembler::new(&ScrapeConfig::default(), fetcher, classifier, store).unwrap()
    }

    #[tokio::test]
    async fn two_valid_nodes_yield_two_persisted_offers() {
        let listing = listing_page(&[
            listing_node(OFFER_1, "Data Engineer", "Pipelines", "du 01/02/2023 au 15 03 2023"),
            listing_node(OFFER_2, "Dev Fullstack", "Web", "du 02/02/2023 au 16/03/2023"),
        ]);
        let fetcher = MockFetcher::new()
            .with_page(LISTING_URL, &listing)
            .with_page(OFFER_1, &detail_page("Profil BAC+5 ou bac + 5, MASTER. Contrat CDI."))
            .with_page(OFFER_2, &detail_page("Mission freelance côté front."));
        let classifier = MockClassifier::with_labels(&["informatique"])
            .with_labels_for(OFFER_2, &["web", "front"]);
        let store = MockStore::new();

        let report = assembler(fetcher, classifier.clone(), store.clone())
            .harvest(LISTING_URL)
            .await
            .unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report.persisted(), 2);

        let created = store.created.lock().unwrap();
        assert_eq!(created.len(), 2);
        for offer in created.iter() {
            assert!(offer.published.is_some());
            assert!(offer.expires.is_some());
            assert!(!offer.contract_type.is_empty());
        }

        let first = created.iter().find(|o| o.url == OFFER_1).unwrap();
        assert_eq!(first.title, "Data Engineer");
        assert_eq!(first.description, "Pipelines");
        assert_eq!(first.published.as_deref(), Some("01/02/2023"));
        assert_eq!(first.expires.as_deref(), Some("15032023"));
        // "BAC+5" appears twice in the content but only once in the set
        assert_eq!(
            first.degrees,
            vec![Degree::new("BAC+5"), Degree::new("MASTER")]
        );
        assert_eq!(first.contract_type, "CDI");
        assert_eq!(first.tags, vec![Tag::new("informatique")]);

        let second = created.iter().find(|o| o.url == OFFER_2).unwrap();
        assert!(second.degrees.is_empty());
        assert_eq!(second.contract_type, "FREELANCE");
        assert_eq!(second.tags, vec![Tag::new("web"), Tag::new("front")]);
        assert_eq!(classifier.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn short_href_is_skipped_without_any_fetch_or_persistence() {
        let listing = listing_page(&[listing_node("/offres/1", "Titre", "Desc", "01/02/2023 15/03/2023")]);
        let fetcher = MockFetcher::new().with_page(LISTING_URL, &listing);
        let store = MockStore::new();

        let report = assembler(fetcher.clone(), MockClassifier::default(), store.clone())
            .harvest(LISTING_URL)
            .await
            .unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(store.created.lock().unwrap().is_empty());
        // only the listing itself was fetched
        assert_eq!(*fetcher.requests.lock().unwrap(), vec![LISTING_URL.to_string()]);
        assert!(matches!(
            report.outcomes[0],
            NodeOutcome::Skipped {
                reason: SkipReason::UrlTooShort,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn detail_fetch_failure_does_not_sink_the_batch() {
        let listing = listing_page(&[
            listing_node(OFFER_1, "A", "a", "01/02/2023 15/03/2023"),
            listing_node(OFFER_2, "B", "b", "01/02/2023 15/03/2023"),
        ]);
        let fetcher = MockFetcher::new()
            .with_page(LISTING_URL, &listing)
            .with_fetch_error(OFFER_1, "HTTP 500 for detail")
            .with_page(OFFER_2, &detail_page("Poste en CDD."));
        let store = MockStore::new();

        let report = assembler(fetcher, MockClassifier::default(), store.clone())
            .harvest(LISTING_URL)
            .await
            .unwrap();

        assert_eq!(report.persisted(), 1);
        assert_eq!(report.failed(), 1);
        let created = store.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].url, OFFER_2);

        let failed = report
            .outcomes
            .iter()
            .find_map(|o| match o {
                NodeOutcome::Failed { url, error } => Some((url, error)),
                _ => None,
            })
            .unwrap();
        assert_eq!(failed.0, OFFER_1);
        assert!(failed.1.is_fetch());
    }

    #[tokio::test]
    async fn unreachable_listing_is_fatal() {
        let fetcher = MockFetcher::new().with_fetch_error(LISTING_URL, "connection refused");
        let err = assembler(fetcher, MockClassifier::default(), MockStore::new())
            .harvest(LISTING_URL)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::HttpError(_)));
    }

    #[tokio::test]
    async fn fewer_than_two_date_tokens_leaves_both_dates_unset() {
        let listing = listing_page(&[listing_node(OFFER_1, "A", "a", "publié le 01/02/2023")]);
        let fetcher = MockFetcher::new()
            .with_page(LISTING_URL, &listing)
            .with_page(OFFER_1, &detail_page("Un CDI."));
        let store = MockStore::new();

        assembler(fetcher, MockClassifier::default(), store.clone())
            .harvest(LISTING_URL)
            .await
            .unwrap();

        let created = store.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert!(created[0].published.is_none());
        assert!(created[0].expires.is_none());
    }

    #[tokio::test]
    async fn unmatched_detail_selector_yields_empty_content_not_an_error() {
        let listing = listing_page(&[listing_node(OFFER_1, "A", "a", "01/02/2023 15/03/2023")]);
        let fetcher = MockFetcher::new()
            .with_page(LISTING_URL, &listing)
            .with_page(OFFER_1, "<html><body><p>no details block</p></body></html>");
        let store = MockStore::new();

        let report = assembler(fetcher, MockClassifier::default(), store.clone())
            .harvest(LISTING_URL)
            .await
            .unwrap();

        assert_eq!(report.persisted(), 1);
        let created = store.created.lock().unwrap();
        assert!(created[0].content.is_empty());
        assert!(created[0].degrees.is_empty());
        assert_eq!(created[0].contract_type, crate::config::DEFAULT_TYPE);
    }

    #[tokio::test]
    async fn detail_content_collapses_doubled_newlines() {
        let listing = listing_page(&[listing_node(OFFER_1, "A", "a", "01/02/2023 15/03/2023")]);
        let detail = "<html><body><div class=\"detailsOffre\">\
                      <div>Première ligne\n\nDeuxième ligne</div>\
                      </div></body></html>";
        let fetcher = MockFetcher::new()
            .with_page(LISTING_URL, &listing)
            .with_page(OFFER_1, detail);
        let store = MockStore::new();

        assembler(fetcher, MockClassifier::default(), store.clone())
            .harvest(LISTING_URL)
            .await
            .unwrap();

        let created = store.created.lock().unwrap();
        assert_eq!(created[0].content, "Première ligne Deuxième ligne");
    }

    #[tokio::test]
    async fn extract_content_uses_the_configured_detail_selector() {
        let fetcher = MockFetcher::new().with_page(OFFER_1, &detail_page("Texte du poste"));
        let svc = assembler(fetcher, MockClassifier::default(), MockStore::new());

        let content = svc.extract_content(OFFER_1).await.unwrap();
        assert_eq!(content, "Texte du poste");

        // unmatched selector yields an empty string, not an error
        let empty = svc.extract_content("https://jobs.example.com/other").await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn rejected_write_surfaces_as_failed_outcome() {
        let listing = listing_page(&[listing_node(OFFER_1, "A", "a", "01/02/2023 15/03/2023")]);
        let fetcher = MockFetcher::new()
            .with_page(LISTING_URL, &listing)
            .with_page(OFFER_1, &detail_page("CDI"));
        let store = MockStore::with_create_error("duplicate url");

        let report = assembler(fetcher, MockClassifier::default(), store)
            .harvest(LISTING_URL)
            .await
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcomes[0],
            NodeOutcome::Failed {
                error: AppError::PersistenceError(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn classifier_failure_prevents_persistence_for_that_node() {
        let listing = listing_page(&[listing_node(OFFER_1, "A", "a", "01/02/2023 15/03/2023")]);
        let fetcher = MockFetcher::new()
            .with_page(LISTING_URL, &listing)
            .with_page(OFFER_1, &detail_page("CDI"));
        let store = MockStore::new();

        let report = assembler(fetcher, MockClassifier::with_error("model offline"), store.clone())
            .harvest(LISTING_URL)
            .await
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_selector_fails_construction() {
        let config = ScrapeConfig {
            offers_selector: ":::".to_string(),
            ..ScrapeConfig::default()
        };
        let err = OfferAssembler::new(
            &config,
            MockFetcher::new(),
            MockClassifier::default(),
            MockStore::new(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::SelectorError(_)));
    }
}
