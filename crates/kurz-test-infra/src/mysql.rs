use crate::Result;
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;

/// Settings for the MySQL container backing the `url_mappings` tests.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "8.4".to_string(), setter(into))]
    image_tag: String,
    #[builder(default = "kurz".to_string(), setter(into))]
    database: String,
    #[builder(default = "kurz".to_string(), setter(into))]
    username: String,
    #[builder(default = "kurz".to_string(), setter(into))]
    password: String,
    /// Log line on stderr that marks the server as accepting connections.
    /// MySQL prints it once for the bootstrap server too, so callers should
    /// still retry their first connection.
    #[builder(default = "ready for connections".to_string(), setter(into))]
    ready_message: String,
    /// First start initialises the data directory, which is slow on CI.
    #[builder(default = Duration::from_secs(120))]
    startup_timeout: Duration,
}

impl MysqlConfig {
    fn image(&self) -> GenericImage {
        GenericImage::new("mysql", self.image_tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr(self.ready_message.as_str()))
    }

    fn database_url(&self, host: &str, port: u16) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.username, self.password, host, port, self.database
        )
    }
}

/// Disposable MySQL server, removed when dropped.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let container = config
            .image()
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.username.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", config.password.as_str())
            .with_startup_timeout(config.startup_timeout)
            .start()
            .await?;

        Ok(Self { container, config })
    }

    pub async fn host(&self) -> Result<String> {
        Ok(self.container.get_host().await?.to_string())
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(MYSQL_PORT).await?)
    }

    /// `mysql://` URL for the configured user and database.
    pub async fn database_url(&self) -> Result<String> {
        let host = self.host().await?;
        let port = self.port().await?;
        Ok(self.config.database_url(&host, port))
    }
}
