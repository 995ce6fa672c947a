//! The run command: execute discovered scenarios.
//!
//! Cases run with whole-case retries per the suite configuration. `--dry-run`
//! executes against the in-memory page model; live execution needs the
//! `browser` feature and a chromium install.

use std::path::Path;
use std::time::Instant;

use pesar::{
    run_with_retries, ConsoleReporter, DryRunExecutor, RunMode, ScenarioDoc, SuiteConfig,
    SuiteResults,
};

use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::discovery::discover_scenarios;
use crate::error::{CliError, CliResult};

/// Execute scenarios and return the process exit code
pub fn run(
    cli: &CliConfig,
    suite: &SuiteConfig,
    root: &Path,
    args: &RunArgs,
) -> CliResult<i32> {
    let mut suite = suite.clone();
    if let Some(base_url) = &args.base_url {
        suite.base_url.clone_from(base_url);
        suite.validate()?;
    }

    let paths = discover_scenarios(root, &suite)?;
    if paths.is_empty() {
        return Err(CliError::discovery(format!(
            "no scenarios match {}",
            suite.scenario_pattern
        )));
    }

    let mut docs = Vec::new();
    for path in &paths {
        let doc = ScenarioDoc::load(path)?;
        if let Some(filter) = &args.filter {
            let keeps_any = doc.name.contains(filter.as_str())
                || doc.cases.iter().any(|c| c.name.contains(filter.as_str()));
            if !keeps_any {
                continue;
            }
        }
        docs.push(doc);
    }
    if docs.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "filter {:?} matches no scenario or case",
            args.filter.as_deref().unwrap_or("")
        )));
    }

    let mode = if args.headed {
        RunMode::Interactive
    } else {
        RunMode::Headless
    };

    if args.dry_run {
        run_dry(cli, &suite, &docs, args, mode)
    } else {
        run_live(cli, &suite, &docs, args, mode)
    }
}

fn run_dry(
    cli: &CliConfig,
    suite: &SuiteConfig,
    docs: &[ScenarioDoc],
    args: &RunArgs,
    mode: RunMode,
) -> CliResult<i32> {
    let reporter = ConsoleReporter::new().with_color(cli.color.should_color());
    let mut exit_code = 0;

    for doc in docs {
        if !cli.verbosity.is_quiet() {
            println!("{}", doc.name);
        }
        let started = Instant::now();
        let mut results = SuiteResults::new(&doc.name);

        for case in &doc.cases {
            if let Some(filter) = &args.filter {
                if !doc.name.contains(filter.as_str()) && !case.name.contains(filter.as_str()) {
                    continue;
                }
            }
            let case_start = Instant::now();
            // Fresh executor per attempt: test isolation.
            let result = run_with_retries(&case.name, suite.retries, mode, || {
                let mut executor = DryRunExecutor::new(suite.clone());
                executor.run_case(case).map_err(|e| e.to_string())
            })
            .with_duration(case_start.elapsed());

            let failed = !result.passed;
            if !cli.verbosity.is_quiet() {
                reporter.report_case(&result);
            }
            results.push(result);
            if failed && args.fail_fast {
                break;
            }
        }

        results.duration = started.elapsed();
        if !cli.verbosity.is_quiet() {
            reporter.report_summary(&results);
        }
        exit_code = exit_code.max(results.exit_code());
    }

    Ok(exit_code)
}

#[cfg(feature = "browser")]
fn run_live(
    cli: &CliConfig,
    suite: &SuiteConfig,
    docs: &[ScenarioDoc],
    args: &RunArgs,
    mode: RunMode,
) -> CliResult<i32> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::execution(format!("tokio runtime: {e}")))?;
    runtime.block_on(live::run_scenarios(cli, suite, docs, args, mode))
}

#[cfg(not(feature = "browser"))]
#[allow(clippy::unnecessary_wraps)]
fn run_live(
    _cli: &CliConfig,
    _suite: &SuiteConfig,
    _docs: &[ScenarioDoc],
    _args: &RunArgs,
    _mode: RunMode,
) -> CliResult<i32> {
    Err(CliError::execution(
        "live execution needs the 'browser' feature; rebuild with --features browser or pass --dry-run",
    ))
}

#[cfg(feature = "browser")]
mod live {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use pesar::{
        assert_interactable, write_artifact, Browser, BrowserConfig, ElementSnapshot,
        ExceptionLog, FormElements, FormRole, InFlightCounter, PageLoader, PesarError,
        PesarResult, PopupDismisser, Selector, ScenarioCase, StabilizationStrategy, Step,
        TestContext, TextExpectation, TestResult, Unit, VisitOptions, VisitStage, WorkflowStep,
    };
    use pesar::{calculate_bmi_steps, timestamped_name};
    use serde::Deserialize;

    const POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Computed element state probed out of the live page
    #[derive(Debug, Deserialize)]
    struct ElementProbe {
        tag: String,
        visible: bool,
        disabled: bool,
        pointer_events: String,
    }

    impl ElementProbe {
        fn snapshot(&self) -> ElementSnapshot {
            let mut el =
                ElementSnapshot::new(&self.tag).with_pointer_events(&self.pointer_events);
            if !self.visible {
                el = el.hidden();
            }
            if self.disabled {
                el = el.disabled();
            }
            el
        }
    }

    pub async fn run_scenarios(
        cli: &CliConfig,
        suite: &SuiteConfig,
        docs: &[ScenarioDoc],
        args: &RunArgs,
        mode: RunMode,
    ) -> CliResult<i32> {
        let reporter = ConsoleReporter::new().with_color(cli.color.should_color());
        let config = BrowserConfig::from_suite(suite, mode);
        let browser = Browser::launch(config).await?;
        let mut exit_code = 0;

        'outer: for doc in docs {
            if !cli.verbosity.is_quiet() {
                println!("{}", doc.name);
            }
            let started = Instant::now();
            let mut results = SuiteResults::new(&doc.name);

            for case in &doc.cases {
                if let Some(filter) = &args.filter {
                    if !doc.name.contains(filter.as_str())
                        && !case.name.contains(filter.as_str())
                    {
                        continue;
                    }
                }
                let case_start = Instant::now();
                let attempts = suite.retries.attempts_for(mode);
                let mut result = TestResult::pass(&case.name);
                for attempt in 1..=attempts {
                    match run_case(&browser, suite, case).await {
                        Ok(()) => {
                            result = TestResult::pass(&case.name).with_attempts(attempt);
                            break;
                        }
                        Err(e) => {
                            result =
                                TestResult::fail(&case.name, e.to_string()).with_attempts(attempt);
                            if e.poisons_session() {
                                break;
                            }
                        }
                    }
                }
                let result = result.with_duration(case_start.elapsed());

                let failed = !result.passed;
                if !cli.verbosity.is_quiet() {
                    reporter.report_case(&result);
                }
                results.push(result);
                if failed && args.fail_fast {
                    results.duration = started.elapsed();
                    reporter.report_summary(&results);
                    exit_code = 1;
                    break 'outer;
                }
            }

            results.duration = started.elapsed();
            if !cli.verbosity.is_quiet() {
                reporter.report_summary(&results);
            }
            exit_code = exit_code.max(results.exit_code());
        }

        browser.close().await?;
        Ok(exit_code)
    }

    async fn run_case(
        browser: &Browser,
        suite: &SuiteConfig,
        case: &ScenarioCase,
    ) -> PesarResult<()> {
        let context = TestContext::for_case(suite);
        let page = browser.new_page().await?;
        let counter = Arc::new(InFlightCounter::new());
        page.install_blocklist(context.blocklist.clone(), Arc::clone(&counter))
            .await?;
        let exceptions = page.watch_exceptions().await?;
        if context.clear_local_storage {
            // about:blank has no storage; cleared again after first navigation.
            tracing::debug!(run_id = %context.run_id, "test isolation active");
        }

        let mut executor = LiveExecutor {
            suite,
            page,
            elements: FormElements::new(),
            dismisser: PopupDismisser::new(),
            loader: PageLoader::new(),
            context,
            exceptions,
            counter,
        };

        let outcome = executor.run_case(case).await;
        if outcome.is_err() && suite.screenshot_on_run_failure {
            executor.capture_failure(&case.name).await;
        }
        outcome
    }

    struct LiveExecutor<'a> {
        suite: &'a SuiteConfig,
        page: pesar::Page,
        elements: FormElements,
        dismisser: PopupDismisser,
        loader: PageLoader,
        context: TestContext,
        exceptions: ExceptionLog,
        counter: Arc<InFlightCounter>,
    }

    impl LiveExecutor<'_> {
        async fn run_case(&mut self, case: &ScenarioCase) -> PesarResult<()> {
            for step in &case.steps {
                self.run_step(step).await?;
                self.check_exceptions()?;
            }
            Ok(())
        }

        /// Fail the case on the first non-benign exception seen so far
        fn check_exceptions(&self) -> PesarResult<()> {
            for message in self.exceptions.take() {
                if self.context.exception_fails_case(&message) {
                    return Err(PesarError::PageException { message });
                }
                tracing::debug!(exception = %message, "benign page exception ignored");
            }
            Ok(())
        }

        async fn run_step(&mut self, step: &Step) -> PesarResult<()> {
            match step {
                Step::Visit { url, options } => self.visit(url, *options).await,
                Step::Fill { field, value } => self.fill(field, value).await,
                Step::Select { field, value } => {
                    let set: bool = self
                        .page
                        .evaluate(&format!(
                            "(() => {{ const el = document.querySelector({sel:?}); \
                             if (!el) return false; el.value = {value:?}; \
                             el.dispatchEvent(new Event('change', {{bubbles: true}})); \
                             return true; }})()",
                            sel = format!("#{field}"),
                        ))
                        .await?;
                    if set {
                        Ok(())
                    } else {
                        Err(PesarError::not_found(format!("#{field}")))
                    }
                }
                Step::CalculateBmi {
                    height,
                    weight,
                    unit,
                } => {
                    let unit = match unit.as_deref() {
                        Some(raw) => Some(Unit::parse(raw).ok_or_else(|| {
                            PesarError::scenario(format!("unknown unit: {raw}"))
                        })?),
                        None => None,
                    };
                    for step in calculate_bmi_steps(height, weight, unit) {
                        self.run_workflow_step(&step).await?;
                    }
                    Ok(())
                }
                Step::ClickCalculate => {
                    self.run_workflow_step(&WorkflowStep::ClickCalculate).await
                }
                Step::ExpectContains { text } => {
                    let body: String = self.page.evaluate("document.body.innerText").await?;
                    TextExpectation::Contains(text.clone()).validate(&body)
                }
                Step::ExpectMatches { target, pattern } => {
                    let text: Option<String> = self
                        .page
                        .evaluate(&format!(
                            "(() => {{ const el = document.querySelector({target:?}); \
                             return el ? el.innerText : null; }})()"
                        ))
                        .await?;
                    let text = text.ok_or_else(|| PesarError::not_found(target.clone()))?;
                    TextExpectation::Matches(pattern.clone()).validate(&text)
                }
                Step::ExpectVisible { target } => {
                    if self.is_visible(target).await? {
                        Ok(())
                    } else {
                        Err(PesarError::assertion(
                            format!("{target} visible"),
                            "absent or hidden",
                        ))
                    }
                }
                Step::ExpectNotVisible { target } => {
                    if self.is_visible(target).await? {
                        Err(PesarError::assertion(
                            format!("{target} absent or hidden"),
                            "visible",
                        ))
                    } else {
                        Ok(())
                    }
                }
                Step::ExpectInteractable { field } => {
                    let snapshot = self.probe_field(field).await?;
                    assert_interactable(&snapshot)
                }
                Step::Screenshot { name } => {
                    let data = self.page.screenshot().await?;
                    let name = timestamped_name(name, chrono::Utc::now());
                    write_artifact(&self.suite.screenshots_folder, &name, &data)?;
                    Ok(())
                }
            }
        }

        async fn visit(&mut self, url: &str, options: VisitOptions) -> PesarResult<()> {
            let resolved = self.suite.resolve_url(url);
            for stage in self.loader.stages(options) {
                match stage {
                    VisitStage::Navigate => {
                        self.page.goto(&resolved).await?;
                        if self.context.clear_local_storage {
                            self.page.clear_storage().await?;
                        }
                    }
                    VisitStage::Stabilize => {
                        self.await_body().await?;
                        self.settle_for_stability().await;
                    }
                    VisitStage::DismissPopups => {
                        self.page.dismiss_popups(&self.dismisser).await?;
                    }
                    VisitStage::Settle => {
                        tokio::time::sleep(self.loader.settle).await;
                    }
                }
            }
            Ok(())
        }

        /// Let the page settle per the configured stabilization strategy
        async fn settle_for_stability(&self) {
            let wait = self.loader.stabilization;
            match wait.strategy {
                StabilizationStrategy::FixedDelay { interval_ms } => {
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
                StabilizationStrategy::NetworkIdle { threshold_ms } => {
                    let deadline = Instant::now() + Duration::from_millis(wait.timeout_ms);
                    let threshold = Duration::from_millis(threshold_ms);
                    while !self.counter.idle_for(threshold) {
                        if Instant::now() >= deadline {
                            // Best-effort; the later assertions decide.
                            tracing::debug!(
                                timeout_ms = wait.timeout_ms,
                                "network never went idle"
                            );
                            break;
                        }
                        tokio::time::sleep(POLL_INTERVAL).await;
                    }
                }
            }
        }

        /// Poll until the document body is rendered
        async fn await_body(&self) -> PesarResult<()> {
            let deadline = Instant::now() + Duration::from_millis(pesar::STABILIZATION_TIMEOUT_MS);
            loop {
                let ready: bool = self
                    .page
                    .evaluate(
                        "Boolean(document.body && \
                         (document.body.offsetWidth > 0 || document.body.offsetHeight > 0))",
                    )
                    .await?;
                if ready {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(PesarError::Timeout {
                        ms: pesar::STABILIZATION_TIMEOUT_MS,
                    });
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }

        async fn run_workflow_step(&mut self, step: &WorkflowStep) -> PesarResult<()> {
            match step {
                WorkflowStep::ClearAndFill { role, value } => {
                    let chain = self.elements.chain_for(*role);
                    for query in chain.queries() {
                        if self.page.clear_and_fill(&query, value).await.is_ok() {
                            return Ok(());
                        }
                    }
                    Err(PesarError::not_found(chain.description))
                }
                WorkflowStep::SelectUnit { unit } => {
                    let query = unit.selector().to_query();
                    if self.page.query_exists(&query).await? {
                        self.page.force_click(&query).await?;
                    }
                    Ok(())
                }
                WorkflowStep::ClickCalculate => {
                    let chain = self.elements.chain_for(FormRole::CalculateControl);
                    for query in chain.queries() {
                        if self.page.query_exists(&query).await? {
                            return self.page.force_click(&query).await;
                        }
                    }
                    Err(PesarError::not_found(chain.description))
                }
                WorkflowStep::AwaitResult { timeout_ms } => {
                    let query = self
                        .elements
                        .chain_for(FormRole::ResultRegion)
                        .queries()
                        .remove(0);
                    let deadline = Instant::now() + Duration::from_millis(*timeout_ms);
                    while Instant::now() < deadline {
                        if self.page.query_exists(&query).await? {
                            return Ok(());
                        }
                        tokio::time::sleep(POLL_INTERVAL).await;
                    }
                    // Bounded, not fatal: assertions decide what the page owes us.
                    tracing::debug!(timeout_ms, "result region did not appear");
                    Ok(())
                }
            }
        }

        async fn fill(&mut self, field: &str, value: &str) -> PesarResult<()> {
            for query in self.field_queries(field) {
                if self.page.clear_and_fill(&query, value).await.is_ok() {
                    return Ok(());
                }
            }
            Err(PesarError::not_found(field.to_string()))
        }

        fn field_queries(&self, field: &str) -> Vec<String> {
            match field {
                "height" => self.elements.chain_for(FormRole::HeightInput).queries(),
                "weight" => self.elements.chain_for(FormRole::WeightInput).queries(),
                other => vec![Selector::Css(format!("#{other}")).to_query()],
            }
        }

        async fn is_visible(&self, target: &str) -> PesarResult<bool> {
            self.page
                .evaluate(&format!(
                    "(() => {{ const el = document.querySelector({target:?}); \
                     return Boolean(el && el.offsetParent !== null); }})()"
                ))
                .await
        }

        async fn probe_field(&self, field: &str) -> PesarResult<ElementSnapshot> {
            for query in self.field_queries(field) {
                let probe: Option<ElementProbe> = self
                    .page
                    .evaluate(&format!(
                        "(() => {{ const el = {query}; if (!el) return null; \
                         const cs = getComputedStyle(el); \
                         return {{ tag: el.tagName.toLowerCase(), \
                                   visible: el.offsetParent !== null, \
                                   disabled: Boolean(el.disabled), \
                                   pointer_events: cs.pointerEvents }}; }})()"
                    ))
                    .await?;
                if let Some(probe) = probe {
                    return Ok(probe.snapshot());
                }
            }
            Err(PesarError::not_found(field.to_string()))
        }

        async fn capture_failure(&mut self, case_name: &str) {
            let name = timestamped_name(&format!("{case_name} (failed)"), chrono::Utc::now());
            match self.page.screenshot().await {
                Ok(data) => {
                    if let Err(e) = write_artifact(&self.suite.screenshots_folder, &name, &data) {
                        tracing::debug!(error = %e, "failure screenshot not written");
                    }
                }
                Err(e) => tracing::debug!(error = %e, "failure screenshot not captured"),
            }
        }
    }
}
