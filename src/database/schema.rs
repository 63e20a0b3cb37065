use super::*;
use const_format::concatcp;

/// `CREATE TABLE IF NOT EXISTS` DDL for every persistent entity.
#[rustfmt::skip]
const CREATES: &str = concatcp!(
    "CREATE TABLE IF NOT EXISTS ", USERS, " (
        id      BIGSERIAL PRIMARY KEY,
        name    TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS ", UNITS, " (
        id                 BIGSERIAL PRIMARY KEY,
        name               TEXT NOT NULL UNIQUE,
        damage             INTEGER NOT NULL,
        defense            INTEGER NOT NULL,
        max_hp             INTEGER NOT NULL CHECK (max_hp > 0),
        speed              INTEGER NOT NULL CHECK (speed >= 0),
        attack_range       INTEGER NOT NULL CHECK (attack_range > 0),
        initiative         INTEGER NOT NULL,
        is_flying          BOOLEAN NOT NULL DEFAULT FALSE,
        is_kamikaze        BOOLEAN NOT NULL DEFAULT FALSE,
        dodge_chance       DOUBLE PRECISION NOT NULL DEFAULT 0,
        crit_chance        DOUBLE PRECISION NOT NULL DEFAULT 0,
        luck               DOUBLE PRECISION NOT NULL DEFAULT 0,
        counter_chance     DOUBLE PRECISION NOT NULL DEFAULT 0,
        effective_against  BIGINT REFERENCES ", UNITS, "(id),
        stack_size         INTEGER NOT NULL CHECK (stack_size > 0)
    );
    CREATE TABLE IF NOT EXISTS ", FIELDS, " (
        name    TEXT PRIMARY KEY,
        width   INTEGER NOT NULL,
        height  INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS ", GAMES, " (
        id              BIGSERIAL PRIMARY KEY,
        player1_id      BIGINT NOT NULL REFERENCES ", USERS, "(id),
        player2_id      BIGINT NOT NULL REFERENCES ", USERS, "(id),
        field_name      TEXT NOT NULL REFERENCES ", FIELDS, "(name),
        status          TEXT NOT NULL DEFAULT 'waiting',
        current_player  BIGINT REFERENCES ", USERS, "(id),
        winner_id       BIGINT REFERENCES ", USERS, "(id),
        round           INTEGER NOT NULL DEFAULT 0,
        seed            BIGINT NOT NULL DEFAULT 0,
        rolls           INTEGER NOT NULL DEFAULT 0,
        version         INTEGER NOT NULL DEFAULT 0,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );
    CREATE TABLE IF NOT EXISTS ", STACKS, " (
        game_id       BIGINT NOT NULL REFERENCES ", GAMES, "(id) ON DELETE CASCADE,
        id            BIGINT NOT NULL,
        player_id     BIGINT NOT NULL REFERENCES ", USERS, "(id),
        unit_id       BIGINT NOT NULL REFERENCES ", UNITS, "(id),
        x             INTEGER NOT NULL,
        y             INTEGER NOT NULL,
        count         INTEGER NOT NULL CHECK (count >= 0),
        remaining_hp  INTEGER NOT NULL,
        has_acted     BOOLEAN NOT NULL DEFAULT FALSE,
        deferred      BOOLEAN NOT NULL DEFAULT FALSE,
        countered     BOOLEAN NOT NULL DEFAULT FALSE,
        morale        DOUBLE PRECISION NOT NULL DEFAULT 0,
        fatigue       DOUBLE PRECISION NOT NULL DEFAULT 0,
        PRIMARY KEY (game_id, id)
    );
    CREATE TABLE IF NOT EXISTS ", OBSTACLES, " (
        game_id  BIGINT NOT NULL REFERENCES ", GAMES, "(id) ON DELETE CASCADE,
        x        INTEGER NOT NULL,
        y        INTEGER NOT NULL,
        PRIMARY KEY (game_id, x, y)
    );
    CREATE TABLE IF NOT EXISTS ", LOGS, " (
        game_id     BIGINT NOT NULL REFERENCES ", GAMES, "(id) ON DELETE CASCADE,
        ordinal     BIGINT NOT NULL CHECK (ordinal > 0),
        kind        TEXT NOT NULL,
        summary     TEXT NOT NULL,
        payload     JSONB NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (game_id, ordinal)
    );"
);

#[rustfmt::skip]
const INDICES: &str = concatcp!(
    "CREATE INDEX IF NOT EXISTS idx_games_pending ON ", GAMES, " (player2_id) WHERE status = 'waiting';
     CREATE INDEX IF NOT EXISTS idx_stacks_game   ON ", STACKS, " (game_id);
     CREATE INDEX IF NOT EXISTS idx_logs_game     ON ", LOGS, " (game_id, ordinal);"
);

/// Field presets and a small default unit catalog, enough to play out of
/// the box. Explicit ids so `effective_against` can cross-reference;
/// sequences are bumped past the seeds afterwards.
#[rustfmt::skip]
const SEEDS: &str = concatcp!(
    "INSERT INTO ", FIELDS, " (name, width, height) VALUES
        ('5x5', 5, 5),
        ('7x7', 7, 7),
        ('10x10', 10, 10)
     ON CONFLICT (name) DO NOTHING;
     INSERT INTO ", UNITS, " (id, name, damage, defense, max_hp, speed, attack_range, initiative,
                              is_flying, is_kamikaze, dodge_chance, crit_chance, luck,
                              counter_chance, effective_against, stack_size) VALUES
        (1, 'Swordsman',  6, 2, 20, 2, 1, 6, FALSE, FALSE, 0.00, 0.10, 0.05, 0.50, NULL, 10),
        (2, 'Archer',     4, 1, 10, 2, 4, 7, FALSE, FALSE, 0.00, 0.10, 0.05, 0.00, 4,    12),
        (3, 'Cavalry',    9, 2, 26, 5, 1, 8, FALSE, FALSE, 0.00, 0.20, 0.05, 0.40, 2,    6),
        (4, 'Griffin',    7, 1, 24, 6, 1, 9, TRUE,  FALSE, 0.15, 0.10, 0.05, 0.40, NULL, 5),
        (5, 'Goblin',     2, 0,  6, 3, 1, 4, FALSE, FALSE, 0.10, 0.05, 0.15, 0.25, NULL, 20),
        (6, 'Powder Keg', 12, 0, 8, 4, 1, 5, FALSE, TRUE,  0.00, 0.00, 0.00, 0.00, NULL, 4)
     ON CONFLICT (id) DO NOTHING;
     INSERT INTO ", USERS, " (id, name) VALUES
        (1, 'alice'),
        (2, 'bob')
     ON CONFLICT (id) DO NOTHING;
     SELECT setval(pg_get_serial_sequence('", UNITS, "', 'id'), (SELECT MAX(id) FROM ", UNITS, "));
     SELECT setval(pg_get_serial_sequence('", USERS, "', 'id'), (SELECT MAX(id) FROM ", USERS, "));"
);

/// Bootstrap the schema. Idempotent; runs at every server start.
pub async fn migrate(client: &tokio_postgres::Client) -> anyhow::Result<()> {
    log::info!("migrating schema");
    client.batch_execute(CREATES).await?;
    client.batch_execute(INDICES).await?;
    client.batch_execute(SEEDS).await?;
    Ok(())
}
