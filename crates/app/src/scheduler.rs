//! Adaptive poll scheduler — one request in flight, ever.
//!
//! A [`PollScheduler`] walks its resource list one URL at a time. Each tick
//! either dispatches the next GET or decides how long to wait:
//!
//! | Situation | Next tick in |
//! |-----------|--------------|
//! | no resources configured | never (until `set_resources`) |
//! | previous request still in flight | 500 ms, same resource |
//! | transport unavailable | 5000 ms, same resource |
//! | request dispatched, more resources left | 100 ms |
//! | request dispatched, list wrapped | current poll interval |
//!
//! Requests run on their own tokio tasks and report back through a channel;
//! the scheduler task alone owns the cursor, the interval, the in-flight flag
//! and the parser, so none of them needs a lock. Failures never leave the
//! scheduler: they are logged and polling carries on.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use statuspoll_domain::error::{FetchError, ValidationError};
use statuspoll_domain::interval::PollInterval;
use statuspoll_domain::observation::ActionFault;
use statuspoll_domain::poll_state::{BUSY_DELAY, PollState, START_DELAY, TRANSPORT_RETRY_DELAY};
use statuspoll_domain::resource::ResourceList;

use crate::parsers::{ParseContext, ResponseParser};
use crate::ports::{HttpRequest, Transport, View};

/// Outcome of one dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub url: String,
    /// Response body, `None` when the request failed.
    pub body: Option<String>,
}

/// Requests accepted by a running scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetResources(ResourceList),
    SetInterval(PollInterval),
}

/// Cloneable handle to a scheduler running on its own task.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SchedulerHandle {
    /// Replace the resource list and restart polling from its first entry.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUrl`] if any URL is blank.
    pub fn set_resources<I, S>(&self, urls: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let resources = ResourceList::new(urls)?;
        self.send(Command::SetResources(resources));
        Ok(())
    }

    /// Change the pause between two full poll cycles.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroInterval`] when `millis` is zero.
    pub fn set_interval(&self, millis: u64) -> Result<(), ValidationError> {
        let interval = PollInterval::from_millis(millis)?;
        self.send(Command::SetInterval(interval));
        Ok(())
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("scheduler stopped, command dropped");
        }
    }
}

/// Single in-flight poll state machine for one device page.
pub struct PollScheduler<T, V, P> {
    transport: T,
    view: V,
    parser: P,
    resources: ResourceList,
    state: PollState,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<T, V, P> PollScheduler<T, V, P>
where
    T: Transport,
    V: View,
    P: ResponseParser,
{
    /// Create an idle scheduler with no resources and the default interval.
    pub fn new(transport: T, view: V, parser: P) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            view,
            parser,
            resources: ResourceList::default(),
            state: PollState::default(),
            completions_tx,
            completions_rx,
        }
    }

    #[must_use]
    pub fn state(&self) -> PollState {
        self.state
    }

    #[must_use]
    pub fn resources(&self) -> &ResourceList {
        &self.resources
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    #[must_use]
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Replace the resource list and rewind to its first entry.
    ///
    /// Returns the delay before the first tick of the new list.
    #[tracing::instrument(skip(self, resources), fields(parser = self.parser.name(), count = resources.len()))]
    pub fn set_resources(&mut self, resources: ResourceList) -> Duration {
        tracing::info!("resource list replaced");
        self.resources = resources;
        self.state.restart();
        START_DELAY
    }

    /// Overwrite the poll interval used at the next cycle boundary.
    pub fn set_interval(&mut self, interval: PollInterval) {
        tracing::debug!(%interval, "poll interval changed");
        self.state.interval = interval;
    }

    /// Run one step of the state machine.
    ///
    /// Returns the delay before the next tick, or `None` when there is
    /// nothing to poll.
    pub fn tick(&mut self) -> Option<Duration> {
        let url = self.resources.get(self.state.index)?.to_string();
        if self.state.in_flight {
            tracing::trace!(%url, "previous request still in flight");
            return Some(BUSY_DELAY);
        }
        let Some(request) = self.transport.create_request() else {
            tracing::warn!(retry_in = ?TRANSPORT_RETRY_DELAY, "no HTTP transport available");
            return Some(TRANSPORT_RETRY_DELAY);
        };

        self.state.in_flight = true;
        self.dispatch(request, url);

        let advance = self.state.advance(self.resources.len());
        Some(self.state.delay_after(advance))
    }

    fn dispatch(&self, request: T::Request, url: String) {
        tracing::debug!(%url, "polling resource");
        let fetch = request.get(url.clone());
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let body = match tokio::spawn(fetch).await {
                Ok(Ok(body)) => Some(body),
                Ok(Err(err)) => {
                    tracing::debug!(%url, error = %err, "status request failed");
                    None
                }
                Err(cause) => {
                    tracing::debug!(%url, error = %FetchError::Aborted, %cause, "status request failed");
                    None
                }
            };
            // The receiver lives as long as the scheduler itself.
            let _ = completions.send(Completion { url, body });
        });
    }

    /// Wait for the next request to finish.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// Release the in-flight slot and hand the body to the parser.
    pub fn complete(&mut self, completion: Completion) {
        self.state.in_flight = false;
        let body = completion.body.as_deref();
        if let Some(fault) = body.and_then(ActionFault::detect) {
            tracing::warn!(
                url = %completion.url,
                code = fault.code,
                description = fault.description,
                "device reported an action fault"
            );
        }
        let mut ctx = ParseContext::new(&self.view, &mut self.state.interval);
        self.parser.parse(body, &mut ctx);
    }

    /// Drive the scheduler until its task is aborted.
    ///
    /// Keeps polling with the last configuration once every
    /// [`SchedulerHandle`] has been dropped.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut deadline: Option<Instant> = None;
        let mut commands_open = true;
        loop {
            tokio::select! {
                () = sleep_until(deadline) => {
                    deadline = self.tick().map(|delay| Instant::now() + delay);
                }
                Some(completion) = self.completions_rx.recv() => self.complete(completion),
                command = commands.recv(), if commands_open => match command {
                    Some(Command::SetResources(resources)) => {
                        deadline = Some(Instant::now() + self.set_resources(resources));
                    }
                    Some(Command::SetInterval(interval)) => self.set_interval(interval),
                    None => {
                        tracing::debug!("all scheduler handles dropped");
                        commands_open = false;
                    }
                },
            }
        }
    }
}

impl<T, V, P> PollScheduler<T, V, P>
where
    T: Transport,
    V: View + 'static,
    P: ResponseParser + 'static,
{
    /// Move the scheduler onto its own task.
    pub fn spawn(self) -> (SchedulerHandle, JoinHandle<()>) {
        let (commands, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx));
        (SchedulerHandle { commands }, task)
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::parsers::BrightnessParser;
    use crate::parsers::brightness::CURRENT_BRIGHTNESS;
    use crate::view::InMemoryView;

    #[derive(Clone)]
    enum Mode {
        Bodies(Arc<HashMap<String, String>>),
        Hang,
        Panic,
    }

    #[derive(Clone)]
    struct FakeTransport {
        mode: Mode,
        available: Arc<AtomicBool>,
        attempts: Arc<AtomicUsize>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl FakeTransport {
        fn new(mode: Mode) -> Self {
            Self {
                mode,
                available: Arc::new(AtomicBool::new(true)),
                attempts: Arc::new(AtomicUsize::new(0)),
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn serving(pairs: &[(&str, &str)]) -> Self {
            let bodies = pairs
                .iter()
                .map(|(url, body)| ((*url).to_string(), (*body).to_string()))
                .collect();
            Self::new(Mode::Bodies(Arc::new(bodies)))
        }

        fn unavailable() -> Self {
            let transport = Self::serving(&[]);
            transport.available.store(false, Ordering::SeqCst);
            transport
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    struct FakeRequest {
        mode: Mode,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl Transport for FakeTransport {
        type Request = FakeRequest;

        fn create_request(&self) -> Option<FakeRequest> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.available.load(Ordering::SeqCst).then(|| FakeRequest {
                mode: self.mode.clone(),
                requested: Arc::clone(&self.requested),
            })
        }
    }

    impl HttpRequest for FakeRequest {
        fn get(
            self,
            url: String,
        ) -> impl Future<Output = Result<String, FetchError>> + Send + 'static {
            self.requested.lock().unwrap().push(url.clone());
            async move {
                match self.mode {
                    Mode::Bodies(bodies) => bodies.get(&url).cloned().ok_or(FetchError::Status(404)),
                    Mode::Hang => std::future::pending().await,
                    Mode::Panic => panic!("transport exploded"),
                }
            }
        }
    }

    type TestScheduler = PollScheduler<FakeTransport, Arc<InMemoryView>, BrightnessParser>;

    fn scheduler(transport: &FakeTransport) -> (TestScheduler, Arc<InMemoryView>) {
        let view = Arc::new(InMemoryView::with_elements([CURRENT_BRIGHTNESS]));
        let scheduler = PollScheduler::new(
            transport.clone(),
            Arc::clone(&view),
            BrightnessParser::default(),
        );
        (scheduler, view)
    }

    fn resources(urls: &[&str]) -> ResourceList {
        ResourceList::new(urls.iter().copied()).unwrap()
    }

    /// Tick, wait for the request and feed it back. Returns the tick delay.
    async fn poll_once(scheduler: &mut TestScheduler) -> Option<Duration> {
        let delay = scheduler.tick();
        let completion = scheduler.next_completion().await.unwrap();
        scheduler.complete(completion);
        delay
    }

    #[tokio::test]
    async fn should_stay_idle_without_resources() {
        let transport = FakeTransport::serving(&[]);
        let (mut scheduler, _) = scheduler(&transport);

        assert_eq!(scheduler.tick(), None);
        assert_eq!(transport.attempts(), 0);
        assert!(!scheduler.state().in_flight);
    }

    #[tokio::test]
    async fn should_start_polling_shortly_after_resources_are_set() {
        let transport = FakeTransport::serving(&[]);
        let (mut scheduler, _) = scheduler(&transport);

        let delay = scheduler.set_resources(resources(&["http://dev/a"]));
        assert_eq!(delay, Duration::from_millis(100));
        assert_eq!(scheduler.state().index, 0);
    }

    #[tokio::test]
    async fn should_visit_resources_in_order_then_wrap() {
        let transport = FakeTransport::serving(&[
            ("http://dev/a", "CurrentBrightness=0"),
            ("http://dev/b", "CurrentBrightness=0"),
            ("http://dev/c", "CurrentBrightness=0"),
        ]);
        let (mut scheduler, _) = scheduler(&transport);
        scheduler.set_resources(resources(&["http://dev/a", "http://dev/b", "http://dev/c"]));
        scheduler.set_interval(PollInterval::from_millis(2_000).unwrap());

        let mut indices = Vec::new();
        let mut delays = Vec::new();
        for _ in 0..4 {
            indices.push(scheduler.state().index);
            delays.push(poll_once(&mut scheduler).await.unwrap());
        }

        assert_eq!(indices, vec![0, 1, 2, 0]);
        assert_eq!(
            transport.requested(),
            vec!["http://dev/a", "http://dev/b", "http://dev/c", "http://dev/a"]
        );
        assert_eq!(delays[0], Duration::from_millis(100));
        assert_eq!(delays[1], Duration::from_millis(100));
        // The parser saw a stable reading and asked for the slow cadence.
        assert_eq!(delays[2], Duration::from_millis(5_000));
        assert_eq!(delays[3], Duration::from_millis(100));
    }

    #[tokio::test]
    async fn should_not_dispatch_while_request_in_flight() {
        let transport = FakeTransport::new(Mode::Hang);
        let (mut scheduler, _) = scheduler(&transport);
        scheduler.set_resources(resources(&["http://dev/a", "http://dev/b"]));

        assert_eq!(scheduler.tick(), Some(Duration::from_millis(100)));
        for _ in 0..5 {
            assert_eq!(scheduler.tick(), Some(Duration::from_millis(500)));
        }

        assert_eq!(transport.requested(), vec!["http://dev/a"]);
        assert_eq!(transport.attempts(), 1);
        assert_eq!(scheduler.state().index, 1);
        assert!(scheduler.state().in_flight);
    }

    #[tokio::test]
    async fn should_back_off_when_transport_unavailable() {
        let transport = FakeTransport::unavailable();
        let (mut scheduler, _) = scheduler(&transport);
        scheduler.set_resources(resources(&["http://dev/a", "http://dev/b"]));

        assert_eq!(scheduler.tick(), Some(Duration::from_millis(5_000)));
        assert_eq!(scheduler.tick(), Some(Duration::from_millis(5_000)));

        assert_eq!(transport.attempts(), 2);
        assert!(transport.requested().is_empty());
        assert_eq!(scheduler.state().index, 0);
        assert!(!scheduler.state().in_flight);
    }

    #[tokio::test]
    async fn should_advance_after_failed_request() {
        let transport = FakeTransport::serving(&[("http://dev/b", "CurrentBrightness=40")]);
        let (mut scheduler, view) = scheduler(&transport);
        scheduler.set_resources(resources(&["http://dev/a", "http://dev/b"]));

        poll_once(&mut scheduler).await;
        assert!(!scheduler.state().in_flight);
        assert_eq!(scheduler.state().index, 1);
        assert_eq!(view.text(CURRENT_BRIGHTNESS).as_deref(), Some(""));

        poll_once(&mut scheduler).await;
        assert_eq!(view.text(CURRENT_BRIGHTNESS).as_deref(), Some("40%"));
    }

    #[tokio::test]
    async fn should_release_slot_when_request_panics() {
        let transport = FakeTransport::new(Mode::Panic);
        let (mut scheduler, _) = scheduler(&transport);
        scheduler.set_resources(resources(&["http://dev/a"]));

        scheduler.tick();
        let completion = scheduler.next_completion().await.unwrap();
        assert_eq!(
            completion,
            Completion {
                url: "http://dev/a".to_string(),
                body: None
            }
        );
        scheduler.complete(completion);
        assert!(!scheduler.state().in_flight);
    }

    #[tokio::test]
    async fn should_apply_parser_interval_at_cycle_boundary() {
        let transport = FakeTransport::serving(&[("http://dev/a", "CurrentBrightness=50\r\n")]);
        let (mut scheduler, view) = scheduler(&transport);
        scheduler.set_resources(resources(&["http://dev/a"]));
        scheduler.set_interval(PollInterval::from_millis(2_000).unwrap());

        // The first delay is computed before any body arrived.
        assert_eq!(poll_once(&mut scheduler).await, Some(Duration::from_millis(2_000)));
        assert_eq!(view.text(CURRENT_BRIGHTNESS).as_deref(), Some("50%"));

        let mut delays = Vec::new();
        for _ in 0..3 {
            delays.push(poll_once(&mut scheduler).await.unwrap());
        }
        assert_eq!(delays, vec![Duration::from_secs(1); 3]);
        assert_eq!(scheduler.parser().change_counter(), 0);
        assert_eq!(scheduler.tick(), Some(Duration::from_millis(5_000)));
    }

    #[tokio::test]
    async fn should_ignore_malformed_body_without_touching_cursor() {
        let transport = FakeTransport::serving(&[
            ("http://dev/a", "foo=bar=baz\r\nfoo\r\n"),
            ("http://dev/b", "foo=bar=baz"),
        ]);
        let (mut scheduler, view) = scheduler(&transport);
        scheduler.set_resources(resources(&["http://dev/a", "http://dev/b"]));

        poll_once(&mut scheduler).await;
        let state = scheduler.state();
        assert_eq!(state.index, 1);
        assert!(!state.in_flight);
        assert_eq!(state.interval, PollInterval::default());
        assert_eq!(view.text(CURRENT_BRIGHTNESS).as_deref(), Some(""));
        assert_eq!(scheduler.parser(), &BrightnessParser::default());
    }

    #[tokio::test]
    async fn should_rewind_when_resources_replaced() {
        let transport = FakeTransport::serving(&[]);
        let (mut scheduler, _) = scheduler(&transport);
        scheduler.set_resources(resources(&["http://dev/a", "http://dev/b"]));
        poll_once(&mut scheduler).await;
        assert_eq!(scheduler.state().index, 1);

        scheduler.set_resources(resources(&["http://dev/c"]));
        assert_eq!(scheduler.state().index, 0);
        assert_eq!(scheduler.resources().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_retry_missing_transport_every_five_seconds() {
        let transport = FakeTransport::unavailable();
        let (scheduler, _) = scheduler(&transport);
        let (handle, task) = scheduler.spawn();
        handle.set_resources(["http://dev/a"]).unwrap();

        // Attempts at 0.1 s, 5.1 s, 10.1 s and 15.1 s.
        tokio::time::sleep(Duration::from_secs(17)).await;
        assert_eq!(transport.attempts(), 4);
        assert!(!task.is_finished());
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn should_never_overlap_hung_request() {
        let transport = FakeTransport::new(Mode::Hang);
        let (scheduler, _) = scheduler(&transport);
        let (handle, task) = scheduler.spawn();
        handle.set_resources(["http://dev/a", "http://dev/b"]).unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(transport.requested(), vec!["http://dev/a"]);
        assert_eq!(transport.attempts(), 1);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_polling_after_handles_dropped() {
        let transport = FakeTransport::serving(&[("http://dev/a", "CurrentBrightness=50\r\n")]);
        let (scheduler, view) = scheduler(&transport);
        let (handle, task) = scheduler.spawn();
        handle.set_resources(["http://dev/a"]).unwrap();
        drop(handle);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(transport.requested().len() > 2);
        assert_eq!(view.text(CURRENT_BRIGHTNESS).as_deref(), Some("50%"));
        task.abort();
    }

    #[tokio::test]
    async fn should_validate_handle_commands() {
        let transport = FakeTransport::serving(&[]);
        let (scheduler, _) = scheduler(&transport);
        let (handle, task) = scheduler.spawn();

        assert_eq!(handle.set_interval(0), Err(ValidationError::ZeroInterval));
        assert_eq!(handle.set_resources([""]), Err(ValidationError::EmptyUrl));
        assert_eq!(handle.set_interval(250), Ok(()));
        task.abort();
    }
}
