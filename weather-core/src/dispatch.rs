//! Turns inbound chat events into replies.
//!
//! [`classify`] decides what an event asks for without touching the network;
//! [`Dispatcher`] performs that action and hands the reply to a [`ChatTransport`].

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{WeatherProvider, WeatherQuery};

/// One message delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: i64,
    /// `None` for updates without a text body (photos, stickers, service messages).
    pub text: Option<String>,
}

impl InboundEvent {
    pub fn from_text(chat_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, text: Some(text.into()) }
    }

    pub fn empty(chat_id: i64) -> Self {
        Self { chat_id, text: None }
    }

    /// Command name when the trimmed text starts with `/`, without the slash and any `@botname` suffix.
    pub fn command(&self) -> Option<&str> {
        let text = self.text.as_deref()?.trim_start().strip_prefix('/')?;
        let word = text.split(char::is_whitespace).next().unwrap_or("");
        let name = word.split('@').next().unwrap_or("");
        (!name.is_empty()).then_some(name)
    }
}

/// A reply destined for one chat. Delivery is not tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Greet,
    LookupWeather(WeatherQuery),
    Ignore,
}

pub fn classify(event: &InboundEvent) -> Action {
    let Some(text) = event.text.as_deref().map(str::trim) else {
        return Action::Ignore;
    };
    if text.is_empty() {
        return Action::Ignore;
    }

    match event.command() {
        Some("start") => Action::Greet,
        // Unknown commands get no reply.
        Some(_) => Action::Ignore,
        None if text.starts_with('/') => Action::Ignore,
        None => Action::LookupWeather(WeatherQuery::new(text)),
    }
}

/// Source of inbound events and sink for replies.
#[async_trait]
pub trait ChatTransport: Send {
    /// Waits for the next event; `None` once the transport has shut down.
    async fn next_event(&mut self) -> Option<InboundEvent>;

    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub struct Dispatcher {
    provider: Box<dyn WeatherProvider>,
    greeting: String,
}

impl Dispatcher {
    pub fn new(provider: Box<dyn WeatherProvider>, greeting: impl Into<String>) -> Self {
        Self { provider, greeting: greeting.into() }
    }

    /// Builds the reply for one event, running at most one weather lookup.
    pub async fn handle(&self, event: &InboundEvent) -> Option<OutboundMessage> {
        let text = match classify(event) {
            Action::Ignore => return None,
            Action::Greet => self.greeting.clone(),
            Action::LookupWeather(query) => match self.provider.lookup(&query).await {
                Ok(result) => {
                    info!(chat_id = event.chat_id, city = %query.city, "weather resolved");
                    result.to_string()
                }
                Err(err) => {
                    info!(chat_id = event.chat_id, city = %query.city, error = %err, "weather lookup failed");
                    format!("Could not get weather: {err}")
                }
            },
        };

        Some(OutboundMessage { chat_id: event.chat_id, text })
    }

    /// Processes events one at a time until the transport runs dry.
    pub async fn run<T: ChatTransport>(&self, transport: &mut T) {
        while let Some(event) = transport.next_event().await {
            let Some(reply) = self.handle(&event).await else {
                debug!(chat_id = event.chat_id, "event ignored");
                continue;
            };

            if let Err(err) = transport.send(&reply).await {
                warn!(chat_id = reply.chat_id, error = %err, "failed to send reply");
            }
        }

        info!("update stream closed, dispatcher stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LookupError, WeatherResult};
    use std::{
        collections::VecDeque,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    const GREETING: &str = "hello";

    #[derive(Debug, Default)]
    struct StubProvider {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn lookup(&self, query: &WeatherQuery) -> Result<WeatherResult, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match query.city.as_str() {
                "London" => Ok(WeatherResult {
                    location_name: "London".into(),
                    condition: "Cloudy".into(),
                    temperature_c: 15.3,
                }),
                other => Err(LookupError::NotFound { city: other.to_string() }),
            }
        }
    }

    struct ScriptedTransport {
        events: VecDeque<InboundEvent>,
        sent: Mutex<Vec<OutboundMessage>>,
        fail_sends_to: Option<i64>,
    }

    impl ScriptedTransport {
        fn new(events: Vec<InboundEvent>) -> Self {
            Self { events: events.into(), sent: Mutex::new(Vec::new()), fail_sends_to: None }
        }

        fn sent(&self) -> Vec<OutboundMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn next_event(&mut self) -> Option<InboundEvent> {
            self.events.pop_front()
        }

        async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()> {
            if self.fail_sends_to == Some(message.chat_id) {
                anyhow::bail!("chat {} is unreachable", message.chat_id);
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<AtomicUsize>) {
        let provider = StubProvider::default();
        let calls = provider.calls.clone();
        (Dispatcher::new(Box::new(provider), GREETING), calls)
    }

    #[test]
    fn classify_covers_commands_text_and_empty() {
        assert_eq!(classify(&InboundEvent::from_text(1, "/start")), Action::Greet);
        assert_eq!(classify(&InboundEvent::from_text(1, "/start@weather_bot")), Action::Greet);
        assert_eq!(classify(&InboundEvent::from_text(1, "/help")), Action::Ignore);
        assert_eq!(classify(&InboundEvent::from_text(1, "/")), Action::Ignore);
        assert_eq!(classify(&InboundEvent::empty(1)), Action::Ignore);
        assert_eq!(classify(&InboundEvent::from_text(1, "   ")), Action::Ignore);
        assert_eq!(
            classify(&InboundEvent::from_text(1, "  Saint Petersburg \n")),
            Action::LookupWeather(WeatherQuery::new("Saint Petersburg"))
        );
    }

    #[test]
    fn command_strips_bot_suffix_and_arguments() {
        assert_eq!(InboundEvent::from_text(1, "/start@bot now").command(), Some("start"));
        assert_eq!(InboundEvent::from_text(1, "London").command(), None);
        assert_eq!(InboundEvent::empty(1).command(), None);
    }

    #[test]
    fn leading_whitespace_does_not_hide_commands() {
        assert_eq!(InboundEvent::from_text(1, "  /start").command(), Some("start"));
        assert_eq!(classify(&InboundEvent::from_text(1, " /start")), Action::Greet);
        assert_eq!(classify(&InboundEvent::from_text(1, "\n/help")), Action::Ignore);
        assert_eq!(classify(&InboundEvent::from_text(1, " / ")), Action::Ignore);
    }

    #[tokio::test]
    async fn start_greets_without_lookup() {
        let (dispatcher, calls) = dispatcher();
        let mut transport = ScriptedTransport::new(vec![InboundEvent::from_text(7, "/start")]);

        dispatcher.run(&mut transport).await;

        assert_eq!(transport.sent(), vec![OutboundMessage { chat_id: 7, text: GREETING.into() }]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_body_produces_no_reply() {
        let (dispatcher, calls) = dispatcher();
        let mut transport = ScriptedTransport::new(vec![InboundEvent::empty(7)]);

        dispatcher.run(&mut transport).await;

        assert!(transport.sent().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn replies_with_weather_or_failure() {
        let (dispatcher, calls) = dispatcher();
        let mut transport = ScriptedTransport::new(vec![
            InboundEvent::from_text(1, "London"),
            InboundEvent::from_text(2, "Nowhereville"),
            InboundEvent::from_text(3, "/settings"),
        ]);

        dispatcher.run(&mut transport).await;

        assert_eq!(
            transport.sent(),
            vec![
                OutboundMessage { chat_id: 1, text: "Weather in London: Cloudy, 15.3°C".into() },
                OutboundMessage {
                    chat_id: 2,
                    text: "Could not get weather: Could not find weather information for city: Nowhereville"
                        .into(),
                },
            ]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn send_failure_does_not_stop_the_loop() {
        let (dispatcher, _) = dispatcher();
        let mut transport = ScriptedTransport::new(vec![
            InboundEvent::from_text(1, "London"),
            InboundEvent::from_text(2, "/start"),
        ]);
        transport.fail_sends_to = Some(1);

        dispatcher.run(&mut transport).await;

        assert_eq!(transport.sent(), vec![OutboundMessage { chat_id: 2, text: GREETING.into() }]);
    }
}
