use crate::config::Config;
use crate::data::{evaluate, should_notify, ChangeResult, StockIngestion};
use crate::error::Result;
use crate::messaging::{MessageId, OutboundMessage, SmsTransport};
use crate::news::{Article, NewsFetcher};
use tracing::{debug, error, info};

/// Outcome of one run, logged by `main`.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub change: ChangeResult,
    pub notified: bool,
    pub articles: usize,
    pub sent: Vec<MessageId>,
    pub failed: usize,
}

/// Renders the SMS body for one article.
pub fn format_alert(company_name: &str, change: &ChangeResult, article: &Article) -> String {
    format!(
        "{}: {} \nHeadline: {}. \nBrief: {} ",
        company_name, change, article.title, article.description
    )
}

/// One pass of: closes -> change -> (gated) news -> one SMS per article.
pub struct AlertPipeline<'a, T: SmsTransport> {
    config: &'a Config,
    stocks: StockIngestion,
    news: NewsFetcher,
    transport: &'a T,
}

impl<'a, T: SmsTransport> AlertPipeline<'a, T> {
    pub fn new(config: &'a Config, client: reqwest::Client, transport: &'a T) -> Self {
        Self {
            config,
            stocks: StockIngestion::new(config, client.clone()),
            news: NewsFetcher::new(config, client),
            transport,
        }
    }

    /// Runs the pipeline once.
    ///
    /// # Errors
    /// Only market-data failures are returned; news and send failures are
    /// logged and reflected in the report instead.
    pub async fn run(&self) -> Result<RunReport> {
        let series = self.stocks.fetch_daily_series(&self.config.symbol).await?;
        let ((prev_date, prev), (curr_date, curr)) = series.latest_two()?;

        info!(
            "{} close on {}: {}, close on {}: {}",
            series.symbol, curr_date, curr.close, prev_date, prev.close
        );
        debug!("{} {}", curr_date, curr);

        let change = evaluate(prev.close, curr.close);
        info!(diff = %change.diff, "{} change: {}", series.symbol, change);

        let notified = should_notify(change.pct);
        let articles = if notified {
            info!("Get News");
            self.news.fetch_recent_articles(&self.config.company_name).await
        } else {
            info!("No News");
            Vec::new()
        };
        for article in &articles {
            info!(
                url = article.url.as_deref().unwrap_or("-"),
                "{} ({})",
                article.title,
                article.published_at.as_deref().unwrap_or("unknown time")
            );
        }

        let mut report = RunReport {
            change,
            notified,
            articles: articles.len(),
            sent: Vec::new(),
            failed: 0,
        };

        for message in self.compose(&change, &articles) {
            match self
                .transport
                .send_sms(&message.body, &message.to, &message.from)
                .await
            {
                Ok(id) => {
                    info!("Message sent successfully to {}. Message SID: {}", message.to, id);
                    report.sent.push(id);
                }
                Err(e) => {
                    error!("Failed to send message: {}", e);
                    report.failed += 1;
                }
            }
            info!("{}", message.body);
        }

        Ok(report)
    }

    fn compose(&self, change: &ChangeResult, articles: &[Article]) -> Vec<OutboundMessage> {
        articles
            .iter()
            .map(|article| OutboundMessage {
                body: format_alert(&self.config.company_name, change, article),
                to: self.config.recipient_number.clone(),
                from: self.config.sender_number.clone(),
            })
            .collect()
    }
}
