use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
