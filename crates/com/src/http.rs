use {
    crate::ComError,
    serde::de::DeserializeOwned,
    std::time::Duration,
};

fn blocking_get(url: &str, timeout: Duration) -> Result<String, ComError> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    match agent.get(url).call() {
        Ok(response) => Ok(response.into_string()?),
        Err(ureq::Error::Status(code, _)) => Err(ComError::Http(format!("{url} returned {code}"))),
        Err(error) => Err(ComError::Http(error.to_string())),
    }
}

/// GET `url` and decode the JSON body.
///
/// The request runs on tokio's blocking pool. Non-2xx statuses are errors.
pub async fn get_json<T: DeserializeOwned>(url: &str, timeout: Duration) -> Result<T, ComError> {
    let owned = url.to_string();
    let body = tokio::task::spawn_blocking(move || blocking_get(&owned, timeout))
        .await
        .map_err(|e| ComError::Http(e.to_string()))??;
    Ok(serde_json::from_str(&body)?)
}
