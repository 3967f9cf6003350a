mod test_api;
mod test_ledger;
mod test_sync;
