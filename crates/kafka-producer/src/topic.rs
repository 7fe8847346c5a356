use crate::config::KafkaProducerConfig;
use producer_perf_core::ClientError;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::types::RDKafkaErrorCode;
use std::time::Duration;

/// Create the destination topic if it doesn't exist yet.
pub async fn create_topic_if_not_exists(
    config: &KafkaProducerConfig,
    topic: &str,
    partitions: i32,
) -> Result<(), ClientError> {
    let admin_client: AdminClient<DefaultClientContext> = config
        .connection_config()
        .create()
        .map_err(|e| ClientError::Topic(format!("failed to create admin client: {e}")))?;

    let new_topic = NewTopic::new(topic, partitions, TopicReplication::Fixed(1));
    let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(5)));

    let results = admin_client
        .create_topics(&[new_topic], &opts)
        .await
        .map_err(|e| ClientError::Topic(e.to_string()))?;

    for result in results {
        match result {
            Ok(topic_name) => {
                tracing::info!("Topic '{topic_name}' created with {partitions} partitions");
            }
            Err((topic_name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                tracing::info!("Topic '{topic_name}' already exists");
            }
            Err((topic_name, err)) => {
                return Err(ClientError::Topic(format!("{topic_name}: {err}")));
            }
        }
    }

    Ok(())
}
