use tokio_postgres::Client;

/// Current schema revision.
const REV_MAJOR: i32 = 1;
const REV_MINOR: i32 = 0;

pub struct Schema {
    name: String,
    sql: &'static str,
}

#[derive(Debug, PartialEq)]
struct Revision {
    pub major: i32,
    pub minor: i32,
}

impl Schema {
    pub fn new(name: &str, sql: &'static str) -> Self {
        Self {
            name: name.to_owned(),
            sql,
        }
    }

    /// Loads the schema if not there yet and checks its revision.
    pub async fn init(&self, client: &mut Client) -> Result<(), tokio_postgres::Error> {
        if !self.schema_exists(client).await? {
            self.load_schema(client).await?;
        }
        let rev = self.schema_revision(client).await?;
        if rev.major != REV_MAJOR || rev.minor != REV_MINOR {
            tracing::warn!(
                "schema {} is at revision {}.{}, expected {}.{}",
                self.name,
                rev.major,
                rev.minor,
                REV_MAJOR,
                REV_MINOR
            );
        }
        Ok(())
    }

    async fn schema_revision(&self, client: &Client) -> Result<Revision, tokio_postgres::Error> {
        tracing::debug!("reading current revision");
        let qry = format!("select rev_major, rev_minor from {}._rev;", self.name);
        let row = client.query_one(&qry, &[]).await?;
        Ok(Revision {
            major: row.get(0),
            minor: row.get(1),
        })
    }

    async fn schema_exists(&self, client: &Client) -> Result<bool, tokio_postgres::Error> {
        tracing::debug!("checking for existing schema");
        let qry = "
        select exists(
            select schema_name
            from information_schema.schemata
            where schema_name = $1
        );";
        Ok(client.query_one(qry, &[&self.name]).await?.get(0))
    }

    async fn load_schema(&self, client: &mut Client) -> Result<(), tokio_postgres::Error> {
        tracing::info!("loading schema {}", self.name);
        let tx = client.transaction().await?;
        tx.batch_execute(self.sql).await?;
        tx.commit().await
    }
}
