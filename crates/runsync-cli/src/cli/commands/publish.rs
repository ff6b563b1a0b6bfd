use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use runsync_client::{ClientConfig, RunsClient};
use runsync_core::{
    CancelSource, JsonResultReader, PublishResult, PublisherConfig, RemoteRunHandle,
    RunAttachmentMode, RunContext, TestRunPublisher,
};
use tracing::{info, warn};

use crate::cli::args::{ContextArgs, PublishArgs};
use crate::exit_codes::{self, EXIT_SUCCESS};

struct Published {
    handle: RemoteRunHandle,
    results: usize,
}

pub async fn run(args: PublishArgs) -> anyhow::Result<i32> {
    let mut client_config = ClientConfig::from_env();
    if let Some(url) = &args.url {
        client_config = client_config.with_url(url);
    }
    if let Some(token) = &args.token {
        client_config = client_config.with_token(token);
    }
    let client = RunsClient::new(client_config).context("failed to configure service client")?;

    let mut config = PublisherConfig::from_env().with_project(&args.project);
    if let Some(concurrency) = args.attachment_concurrency {
        config = config.with_attachment_concurrency(concurrency);
    }

    let cancel = CancelSource::new();
    let publisher = TestRunPublisher::with_cancel(
        Arc::new(client),
        Arc::new(JsonResultReader),
        config,
        cancel.token(),
    );

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, canceling publish");
            cancel.cancel();
        }
    });

    let mode = if args.archive {
        RunAttachmentMode::Archive
    } else {
        RunAttachmentMode::Individual
    };
    let mut context = run_context(&args.context);
    let outcome = publish_file(
        &publisher,
        &mut context,
        &args.file,
        args.run_name.as_deref(),
        mode,
    )
    .await;
    interrupt.abort();

    match outcome {
        Ok(published) => {
            println!(
                "Published {} results to run {} ({})",
                published.results, published.handle.id, published.handle.name
            );
            Ok(EXIT_SUCCESS)
        }
        Err(err) => {
            let code = exit_codes::for_publish_error(&err);
            eprintln!("error: {:#}", anyhow::Error::from(err));
            Ok(code)
        }
    }
}

async fn publish_file(
    publisher: &TestRunPublisher,
    context: &mut RunContext,
    file: &Path,
    run_name: Option<&str>,
    mode: RunAttachmentMode,
) -> PublishResult<Published> {
    let run = publisher.read_results_from_file(context, file, run_name)?;
    info!(
        file = %file.display(),
        results = run.results.len(),
        attachments = run.attachments.len(),
        "results file read"
    );

    let mut session = publisher.session(run);
    let handle = session.start().await?;
    let ids = session.add_run_results().await?;
    session.end(mode).await?;

    Ok(Published {
        handle,
        results: ids.len(),
    })
}

fn run_context(args: &ContextArgs) -> RunContext {
    RunContext::new(
        &args.owner,
        &args.platform,
        &args.configuration,
        args.build_id,
        &args.build_uri,
        &args.release_uri,
        &args.release_environment_uri,
    )
}
