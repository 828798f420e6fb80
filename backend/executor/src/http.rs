use reqwest::{Client, Method};
use tracing::{info, warn};

use cronpilot_core::Job;

use crate::executor::Failure;

/// Issue the job's request. Any 2xx status is success.
pub async fn run(client: &Client, job: &Job) -> Result<String, Failure> {
    let method_name = job.http_method().to_uppercase();
    let method = Method::from_bytes(method_name.as_bytes())
        .map_err(|_| Failure::new("", format!("invalid HTTP method: {}", method_name)))?;

    let mut request = client.request(method.clone(), &job.command);
    match job.header_map() {
        Ok(headers) => {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }
        Err(e) => {
            warn!(job_id = job.id, error = %e, "Ignoring unparseable headers");
        }
    }

    info!(job_id = job.id, method = %method, url = %job.command, "Executing HTTP request");

    let response = request
        .send()
        .await
        .map_err(|e| Failure::new("", e.to_string()))?;
    let status = response.status();
    let output = format!("HTTP {} {} - Status: {}", method, job.command, status);

    if status.is_success() {
        Ok(output)
    } else {
        Err(Failure::new(
            output,
            format!("HTTP request failed with status code: {}", status.as_u16()),
        ))
    }
}
