use tokio_postgres::GenericClient;
use tokio_postgres::Transaction;

use super::write_error;
use crate::core::types::EvmAddress;
use crate::store::types::EvmContractRecord;
use crate::store::StoreError;

pub(super) async fn get(
    client: &impl GenericClient,
    id: &EvmAddress,
) -> Result<Option<EvmContractRecord>, StoreError> {
    tracing::trace!("get {id}");
    let qry = "
        select id
            , extrinsic_hash
            , transaction_hash
            , deployer_id
            , height
            , timestamp
            , bytecode
            , bytecode_context
            , bytecode_arguments
            , contract_type
            , name
            , symbol
            , decimals
            , uri
        from sw.evm_contracts
        where id = $1;";
    Ok(client
        .query_opt(qry, &[&id])
        .await?
        .map(|row| EvmContractRecord {
            id: row.get(0),
            extrinsic_hash: row.get(1),
            transaction_hash: row.get(2),
            deployer_id: row.get(3),
            height: row.get(4),
            timestamp: row.get(5),
            bytecode: row.get(6),
            bytecode_context: row.get(7),
            bytecode_arguments: row.get(8),
            contract_type: row.get(9),
            name: row.get(10),
            symbol: row.get(11),
            decimals: row.get(12),
            uri: row.get(13),
        }))
}

pub(super) async fn insert(
    pgtx: &Transaction<'_>,
    record: &EvmContractRecord,
) -> Result<(), StoreError> {
    tracing::trace!("insert {}", record.id);
    let stmt = "
        insert into sw.evm_contracts (
            id,
            extrinsic_hash,
            transaction_hash,
            deployer_id,
            height,
            timestamp,
            bytecode,
            bytecode_context,
            bytecode_arguments,
            contract_type,
            name,
            symbol,
            decimals,
            uri
        )
        values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14);";
    pgtx.execute(
        stmt,
        &[
            &record.id,
            &record.extrinsic_hash,
            &record.transaction_hash,
            &record.deployer_id,
            &record.height,
            &record.timestamp,
            &record.bytecode,
            &record.bytecode_context,
            &record.bytecode_arguments,
            &record.contract_type,
            &record.name,
            &record.symbol,
            &record.decimals,
            &record.uri,
        ],
    )
    .await
    .map_err(|e| write_error(e, "evm contract", &record.id))?;
    Ok(())
}
